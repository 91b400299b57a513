//! Concurrent runs: one in flight per signer, independent across signers

use std::time::Duration;

use krc20_inscribe::operator::MintRequest;
use krc20_inscribe::utils::currency::SOMPI_PER_KAS;

use crate::common::{
    as_signer, funded_ledger, operator, signer, test_settings, TxKind, OTHER_SIGNER_ADDRESS, SIGNER_ADDRESS,
};

fn mint(ticker: &str) -> MintRequest {
    MintRequest {
        ticker: ticker.to_string(),
        ..MintRequest::default()
    }
}

#[tokio::test]
async fn test_same_signer_runs_are_serialised() -> anyhow::Result<()> {
    let ledger = funded_ledger(10);
    ledger.configure(|b| b.event_delay = Some(Duration::from_millis(50)));
    let operator = operator(&ledger, test_settings());
    let signer = as_signer(&signer(SIGNER_ADDRESS));

    let (first, second) = tokio::join!(
        operator.mint(signer.clone(), mint("ALPHA")),
        operator.mint(signer.clone(), mint("BETA")),
    );

    assert!(first.is_accepted(), "first run: {:?}", first.outcome);
    assert!(second.is_accepted(), "second run: {:?}", second.outcome);

    // The second commit waits until the first run has finished
    assert_eq!(
        ledger.submitted_kinds(),
        vec![TxKind::Commit, TxKind::Reveal, TxKind::Commit, TxKind::Reveal]
    );
    assert!(second.started_at >= first.finished_at);
    assert_eq!(operator.tracked_signers(), 0);

    Ok(())
}

#[tokio::test]
async fn test_signer_locks_released_after_runs() -> anyhow::Result<()> {
    let ledger = funded_ledger(10);
    ledger.fund(OTHER_SIGNER_ADDRESS, 10 * SOMPI_PER_KAS);
    let operator = operator(&ledger, test_settings());

    let first = operator.mint(as_signer(&signer(SIGNER_ADDRESS)), mint("KASPY")).await;
    assert!(first.is_accepted());
    assert_eq!(operator.tracked_signers(), 0);

    // Failed runs release their lock as well
    let rejected = operator.mint(as_signer(&signer(OTHER_SIGNER_ADDRESS)), mint("")).await;
    assert!(!rejected.is_accepted());
    ledger.configure(|b| b.fail_commit_submit = Some("mempool full".to_string()));
    let failed = operator.mint(as_signer(&signer(OTHER_SIGNER_ADDRESS)), mint("KASPY")).await;
    assert!(!failed.is_accepted());
    assert_eq!(operator.tracked_signers(), 0);

    Ok(())
}

#[tokio::test]
async fn test_distinct_signers_run_independently() -> anyhow::Result<()> {
    let ledger = funded_ledger(10);
    ledger.fund(OTHER_SIGNER_ADDRESS, 10 * SOMPI_PER_KAS);
    ledger.configure(|b| b.event_delay = Some(Duration::from_millis(50)));
    let operator = operator(&ledger, test_settings());

    let (first, second) = tokio::join!(
        operator.mint(as_signer(&signer(SIGNER_ADDRESS)), mint("KASPY")),
        operator.mint(as_signer(&signer(OTHER_SIGNER_ADDRESS)), mint("KASPY")),
    );

    assert!(first.is_accepted(), "first run: {:?}", first.outcome);
    assert!(second.is_accepted(), "second run: {:?}", second.outcome);

    // Both commits go out before either reveal
    assert_eq!(
        ledger.submitted_kinds(),
        vec![TxKind::Commit, TxKind::Commit, TxKind::Reveal, TxKind::Reveal]
    );

    // Same key and payload, so both runs share the script address; each
    // reveal still spends only its own commit output
    assert_eq!(first.script_address, second.script_address);
    let submitted = ledger.submitted();
    let reveal_inputs: Vec<_> = submitted
        .iter()
        .filter(|(kind, _)| *kind == TxKind::Reveal)
        .map(|(_, tx)| tx.inputs[0].utxo.outpoint.transaction_id)
        .collect();
    assert!(reveal_inputs.contains(&first.commit_tx_id.unwrap()));
    assert!(reveal_inputs.contains(&second.commit_tx_id.unwrap()));

    Ok(())
}
