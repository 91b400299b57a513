//! Runs where the transaction builder returns more or fewer than one transaction

use krc20_inscribe::operator::MintRequest;
use krc20_inscribe::orchestrator::{FailureReason, RunOutcome};

use crate::common::mock_signer::SCRIPT_SIGNATURE_LEN;
use crate::common::{as_signer, funded_ledger, operator, signer, test_settings, MockLedger, TxKind, SIGNER_ADDRESS};

fn mint() -> MintRequest {
    MintRequest {
        ticker: "KASPY".to_string(),
        ..MintRequest::default()
    }
}

#[tokio::test]
async fn test_compounding_builder_records_final_transactions() -> anyhow::Result<()> {
    let ledger = funded_ledger(10);
    ledger.configure(|b| b.compound_first = true);
    let operator = operator(&ledger, test_settings());

    let report = operator.mint(as_signer(&signer(SIGNER_ADDRESS)), mint()).await;
    assert_eq!(report.outcome, RunOutcome::Accepted);

    let submitted = ledger.submitted();
    assert_eq!(
        ledger.submitted_kinds(),
        vec![TxKind::Compound, TxKind::Commit, TxKind::Compound, TxKind::Reveal]
    );

    // Commit is the last transaction of the commit batch, not the compounding one
    let commit = report.commit_tx_id.expect("commit id recorded");
    assert_ne!(commit, submitted[0].1.id);
    assert_eq!(commit, submitted[1].1.id);
    assert_eq!(submitted[1].1.outputs[0].address, report.script_address.clone().unwrap());

    // Reveal is the transaction spending the script output
    let reveal = report.reveal_tx_id.expect("reveal id recorded");
    assert_ne!(reveal, submitted[2].1.id);
    let (_, reveal_tx) = &submitted[3];
    assert_eq!(reveal_tx.id, reveal);
    let script_input = reveal_tx
        .inputs
        .iter()
        .find(|input| input.utxo.outpoint.transaction_id == commit)
        .expect("reveal spends the commit output");
    assert_eq!(script_input.signature_script[0] as usize, SCRIPT_SIGNATURE_LEN);

    // The compounding transaction never touches the script output
    let (_, compound_tx) = &submitted[2];
    assert!(compound_tx
        .inputs
        .iter()
        .all(|input| input.utxo.outpoint.transaction_id != commit));

    Ok(())
}

#[tokio::test]
async fn test_empty_commit_build_is_broadcast_error() -> anyhow::Result<()> {
    let ledger = funded_ledger(10);
    ledger.configure(|b| b.empty_build = Some(TxKind::Commit));
    let operator = operator(&ledger, test_settings());

    let report = operator.mint(as_signer(&signer(SIGNER_ADDRESS)), mint()).await;

    match report.reason() {
        Some(FailureReason::BroadcastError(detail)) => assert!(detail.contains("no commit transaction")),
        other => panic!("expected BroadcastError, got {:?}", other),
    }
    assert!(report.commit_tx_id.is_none());
    assert_eq!(MockLedger::count(&ledger.calls.submit), 0);

    Ok(())
}

#[tokio::test]
async fn test_empty_reveal_build_is_reveal_submit_failure() -> anyhow::Result<()> {
    let ledger = funded_ledger(10);
    ledger.configure(|b| b.empty_build = Some(TxKind::Reveal));
    let operator = operator(&ledger, test_settings());

    let report = operator.mint(as_signer(&signer(SIGNER_ADDRESS)), mint()).await;

    assert!(matches!(report.reason(), Some(FailureReason::RevealSubmitFailed(_))));
    assert!(report.commit_tx_id.is_some());
    assert!(report.reveal_tx_id.is_none());
    assert_eq!(ledger.submitted_kinds(), vec![TxKind::Commit]);

    Ok(())
}
