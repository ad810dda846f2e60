use crate::{ALICE, LIST, TOKEN_TEXT, ether, list_total};
use alloy::primitives::U256;
use batch_sender::{
    ActionOutcome, BatchError, Controller, ProgressState, ProviderError, SenderConfig,
    StatusKind, WalletEvent,
    test_utils::{MOCK_ACCOUNT, MockCall, MockWallet},
};
use std::{sync::Arc, time::Duration};
use tokio::sync::Notify;

fn controller(wallet: MockWallet) -> (Arc<MockWallet>, Controller<MockWallet>) {
    let wallet = Arc::new(wallet);
    (
        Arc::clone(&wallet),
        Controller::new(Arc::clone(&wallet), SenderConfig::default()),
    )
}

/// Controller with a connected account and a filled form.
async fn ready(wallet: MockWallet) -> (Arc<MockWallet>, Controller<MockWallet>) {
    let (wallet, controller) = controller(wallet);
    controller.connect_wallet().await.unwrap();
    controller.set_token_address(TOKEN_TEXT);
    controller.set_recipients_text(LIST);
    wallet.clear_calls();
    (wallet, controller)
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached");
}

#[tokio::test]
async fn test_first_action_connects_wallet() {
    let (wallet, controller) = controller(MockWallet::new());
    assert_eq!(controller.action_label(), "Connect Wallet");

    let outcome = controller.handle_action().await.unwrap();

    assert_eq!(outcome, ActionOutcome::Connected(MOCK_ACCOUNT));
    assert_eq!(controller.account(), Some(MOCK_ACCOUNT));
    assert_eq!(wallet.calls(), vec![MockCall::RequestAccounts]);
    assert_eq!(controller.action_label(), "Run Batch Distribution");
}

#[tokio::test]
async fn test_connect_stores_first_account() {
    let (_, controller) = controller(MockWallet::new().with_accounts(vec![ALICE, MOCK_ACCOUNT]));
    assert_eq!(controller.connect_wallet().await.unwrap(), ALICE);
    assert_eq!(controller.account(), Some(ALICE));
}

#[tokio::test]
async fn test_connection_failure_reports_error() {
    let (_, controller) = controller(
        MockWallet::new().rejecting_connection(ProviderError::with_reason("User rejected the request.")),
    );

    let err = controller.connect_wallet().await.unwrap_err();

    assert!(matches!(err, BatchError::ConnectionFailed(_)));
    assert_eq!(controller.account(), None);
    let status = controller.status().current().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
    assert_eq!(status.text, "Wallet connection failed");
}

#[tokio::test]
async fn test_empty_account_list_is_a_connection_failure() {
    let (_, controller) = controller(MockWallet::new().with_accounts(vec![]));
    assert!(matches!(
        controller.connect_wallet().await,
        Err(BatchError::ConnectionFailed(_))
    ));
}

#[tokio::test]
async fn test_successful_run_clears_input() {
    let (_, controller) = ready(MockWallet::new()).await;

    let outcome = controller.handle_action().await.unwrap();

    let ActionOutcome::Distributed(receipt) = outcome else {
        panic!("expected a distribution");
    };
    assert_eq!(receipt.recipients, 2);
    assert_eq!(receipt.total, list_total());

    let state = controller.snapshot();
    assert_eq!(state.recipients_text, "");
    assert_eq!(state.token_address, TOKEN_TEXT);
    assert_eq!(state.progress, ProgressState::Idle);
    assert!(!state.busy);

    let status = controller.status().current().unwrap();
    assert_eq!(status.kind, StatusKind::Success);
    assert_eq!(status.text, "🎉 Successfully sent to 2 addresses!");
}

#[tokio::test]
async fn test_status_feed_reports_every_step() {
    let (_, controller) = ready(MockWallet::new()).await;
    let mut feed = controller.status().feed();

    controller.handle_action().await.unwrap();

    let texts: Vec<_> = std::iter::from_fn(|| feed.try_recv().ok())
        .map(|m| m.text)
        .collect();
    assert_eq!(texts.len(), 5);
    assert_eq!(texts[0], "Step 1: Approving token usage...");
    assert_eq!(texts[1], "Approval confirmed! Moving to distribution...");
    assert_eq!(texts[2], "Step 2: Distributing tokens to recipients...");
    assert!(texts[3].starts_with("Transaction sent: "));
    assert_eq!(texts[4], "🎉 Successfully sent to 2 addresses!");
}

#[tokio::test]
async fn test_failed_run_preserves_input() {
    let (_, controller) = ready(
        MockWallet::new()
            .with_allowance(ether(100))
            .rejecting_transfer(ProviderError::with_reason("execution reverted: paused")),
    )
    .await;

    let err = controller.handle_action().await.unwrap_err();

    assert_eq!(err.to_string(), "execution reverted: paused");
    let state = controller.snapshot();
    assert_eq!(state.recipients_text, LIST);
    assert_eq!(state.progress, ProgressState::Idle);
    assert!(!state.busy);

    let status = controller.status().current().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
    assert_eq!(status.text, "execution reverted: paused");
}

#[tokio::test]
async fn test_opaque_provider_error_uses_generic_text() {
    let (_, controller) =
        ready(MockWallet::new().rejecting_approval(ProviderError::opaque())).await;

    controller.handle_action().await.unwrap_err();

    assert_eq!(
        controller.status().current().unwrap().text,
        "Transaction failed"
    );
}

#[tokio::test]
async fn test_preconditions_abort_without_provider_calls() {
    let (wallet, controller) = ready(MockWallet::new()).await;

    controller.set_token_address("0xnot-a-token");
    assert!(matches!(
        controller.handle_action().await,
        Err(BatchError::InvalidTokenAddress(_))
    ));
    assert_eq!(
        controller.status().current().unwrap().text,
        "Please check Token Address and List"
    );

    controller.set_token_address(TOKEN_TEXT);
    controller.set_recipients_text("");
    assert_eq!(
        controller.handle_action().await,
        Err(BatchError::EmptyRecipientList)
    );

    assert!(wallet.calls().is_empty());
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn test_wrong_network_reports_switch_message() {
    let (wallet, controller) = ready(MockWallet::new().with_chain_id(97)).await;

    controller.handle_action().await.unwrap_err();

    assert_eq!(wallet.calls(), vec![MockCall::ChainId]);
    assert_eq!(
        controller.status().current().unwrap().text,
        "Please switch to BSC Mainnet"
    );
    assert_eq!(controller.snapshot().recipients_text, LIST);
}

#[tokio::test]
async fn test_busy_controller_rejects_second_action() {
    let gate = Arc::new(Notify::new());
    let (wallet, controller) = ready(
        MockWallet::new()
            .with_allowance(U256::MAX)
            .with_receipt_gate(Arc::clone(&gate)),
    )
    .await;

    let running = tokio::spawn({
        let controller = controller.clone();
        async move { controller.handle_action().await }
    });

    wait_until(|| {
        wallet
            .calls()
            .iter()
            .any(|c| matches!(c, MockCall::WaitForReceipt(_)))
    })
    .await;

    assert!(controller.is_busy());
    assert_eq!(controller.progress(), ProgressState::Distributing);
    assert_eq!(controller.action_label(), "Step 2: Processing...");
    let info = controller.status().current().unwrap();
    assert_eq!(info.kind, StatusKind::Info);
    assert!(info.text.starts_with("Transaction sent: "));

    let calls_before = wallet.calls().len();
    assert_eq!(controller.handle_action().await, Err(BatchError::Busy));
    assert_eq!(wallet.calls().len(), calls_before);

    gate.notify_one();
    let outcome = running.await.unwrap().unwrap();
    assert!(matches!(outcome, ActionOutcome::Distributed(_)));
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn test_accounts_changed_updates_and_clears_account() {
    let (wallet, controller) = controller(MockWallet::new());
    let _subscription = controller.subscribe_wallet_events();

    wallet.emit(WalletEvent::AccountsChanged(vec![ALICE]));
    wait_until(|| controller.account() == Some(ALICE)).await;

    wallet.emit(WalletEvent::AccountsChanged(vec![]));
    wait_until(|| controller.account().is_none()).await;
}

#[tokio::test]
async fn test_chain_changed_reloads_state() {
    let (wallet, controller) = ready(MockWallet::new()).await;
    controller.status().error("stale message");
    let _subscription = controller.subscribe_wallet_events();

    wallet.emit(WalletEvent::ChainChanged(56));
    wait_until(|| controller.snapshot().generation == 1).await;

    let state = controller.snapshot();
    assert_eq!(state.account, None);
    assert_eq!(state.chain_id, Some(56));
    assert_eq!(state.token_address, "");
    assert_eq!(state.recipients_text, "");
    assert!(controller.status().current().is_none());
}

#[tokio::test]
async fn test_reload_during_flow_discards_late_updates() {
    let gate = Arc::new(Notify::new());
    let (wallet, controller) = ready(
        MockWallet::new()
            .with_allowance(U256::MAX)
            .with_receipt_gate(Arc::clone(&gate)),
    )
    .await;

    let running = tokio::spawn({
        let controller = controller.clone();
        async move { controller.handle_action().await }
    });
    wait_until(|| controller.progress() == ProgressState::Distributing).await;

    controller.on_wallet_event(WalletEvent::ChainChanged(97));
    gate.notify_one();
    running.await.unwrap().unwrap();

    let state = controller.snapshot();
    assert_eq!(state.generation, 1);
    assert_eq!(state.progress, ProgressState::Idle);
    assert!(!state.busy);
    assert_eq!(state.account, None);
    assert!(controller.status().current().is_none());
    assert_eq!(wallet.submissions().len(), 1);
}

#[tokio::test]
async fn test_chain_change_during_approval_cancels_distribution() {
    let gate = Arc::new(Notify::new());
    let (wallet, controller) = ready(MockWallet::new().with_receipt_gate(Arc::clone(&gate))).await;

    let running = tokio::spawn({
        let controller = controller.clone();
        async move { controller.handle_action().await }
    });
    wait_until(|| {
        wallet
            .calls()
            .iter()
            .any(|c| matches!(c, MockCall::WaitForReceipt(_)))
    })
    .await;
    assert_eq!(controller.progress(), ProgressState::Approving);

    wallet.set_chain_id(97);
    controller.on_wallet_event(WalletEvent::ChainChanged(97));

    // The stale flow still owns the provider until it returns.
    assert!(controller.is_busy());
    assert_eq!(controller.handle_action().await, Err(BatchError::Busy));

    gate.notify_one();
    assert_eq!(running.await.unwrap(), Err(BatchError::Cancelled));

    let submissions = wallet.submissions();
    assert_eq!(submissions.len(), 1);
    assert!(matches!(submissions[0], MockCall::Approve { .. }));

    let state = controller.snapshot();
    assert!(!state.busy);
    assert_eq!(state.progress, ProgressState::Idle);
    assert_eq!(state.chain_id, Some(97));
    assert!(controller.status().current().is_none());
}

#[tokio::test]
async fn test_dropping_subscription_unsubscribes() {
    let (wallet, controller) = controller(MockWallet::new());
    let subscription = controller.subscribe_wallet_events();
    assert_eq!(wallet.subscriber_count(), 1);

    drop(subscription);
    wait_until(|| wallet.subscriber_count() == 0).await;

    wallet.emit(WalletEvent::AccountsChanged(vec![ALICE]));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(controller.account(), None);
}

#[tokio::test(start_paused = true)]
async fn test_success_message_auto_clears() {
    let (_, controller) = ready(MockWallet::new()).await;
    controller.handle_action().await.unwrap();
    assert!(controller.status().current().is_some());

    tokio::time::sleep(Duration::from_secs(9)).await;
    assert!(controller.status().current().is_none());
}
