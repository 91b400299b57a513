//! Façade validation: rejected parameters never reach the ledger

use krc20_inscribe::operator::{DeployRequest, MintRequest, TransferRequest};
use krc20_inscribe::orchestrator::{FailureReason, RunStatus};

use crate::common::{as_signer, funded_ledger, operator, signer, test_settings, SIGNER_ADDRESS};

#[tokio::test]
async fn test_deploy_without_max_supply_makes_no_ledger_calls() {
    let ledger = funded_ledger(2000);
    let operator = operator(&ledger, test_settings());

    let report = operator
        .deploy(
            as_signer(&signer(SIGNER_ADDRESS)),
            DeployRequest {
                ticker: "KASPY".to_string(),
                mint_limit: Some("1000".to_string()),
                ..DeployRequest::default()
            },
        )
        .await;

    assert_eq!(report.status(), RunStatus::Failed);
    assert!(matches!(report.reason(), Some(FailureReason::ValidationError(_))));
    assert_eq!(report.reason().unwrap().code(), "validation_error");
    assert!(report.phases.is_empty());
    assert!(report.commit_tx_id.is_none());
    assert_eq!(ledger.calls.total(), 0);
}

#[tokio::test]
async fn test_transfer_without_destination_makes_no_ledger_calls() {
    let ledger = funded_ledger(10);
    let operator = operator(&ledger, test_settings());

    let report = operator
        .transfer(
            as_signer(&signer(SIGNER_ADDRESS)),
            TransferRequest {
                ticker: "KASPY".to_string(),
                amount: Some("5".to_string()),
                ..TransferRequest::default()
            },
        )
        .await;

    assert!(matches!(report.reason(), Some(FailureReason::ValidationError(detail)) if detail.contains("destination")));
    assert_eq!(ledger.calls.total(), 0);
}

#[tokio::test]
async fn test_invalid_ticker_makes_no_ledger_calls() {
    let ledger = funded_ledger(10);
    let operator = operator(&ledger, test_settings());

    let report = operator
        .mint(
            as_signer(&signer(SIGNER_ADDRESS)),
            MintRequest {
                ticker: "not a ticker".to_string(),
                ..MintRequest::default()
            },
        )
        .await;

    assert_eq!(report.status(), RunStatus::Failed);
    assert_eq!(ledger.calls.total(), 0);
}

#[tokio::test]
async fn test_oversized_payload_fails_before_ledger_calls() {
    let ledger = funded_ledger(10);
    let operator = operator(&ledger, test_settings());

    let report = operator
        .mint(
            as_signer(&signer(SIGNER_ADDRESS)),
            MintRequest {
                ticker: "T".repeat(600),
                ..MintRequest::default()
            },
        )
        .await;

    assert!(matches!(report.reason(), Some(FailureReason::PayloadTooLarge { .. })));
    assert_eq!(ledger.calls.total(), 0);
}
