mod common;

use anyhow::Result;
use common::{StandardClients, test_ledger};
use loanbook::application::{
    LedgerError, LoanActionRequest, OriginationRequest, PaymentRequest, parse_amount,
    parse_category,
};
use loanbook::domain::{HistoryAction, LoanCategory};
use loanbook::storage::LedgerStore;

#[tokio::test]
async fn test_scenario_a_ordinary_origination() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;

    let client = StandardClients::ordinary_1000(&ledger).await?;

    assert_eq!(client.category, LoanCategory::Ordinary);
    assert_eq!(client.balance, 100_000);
    assert_eq!(client.interest, 10_000);

    // The stored row matches what was returned
    let stored = ledger.get_client(client.id).await?;
    assert_eq!(stored, client);

    Ok(())
}

#[tokio::test]
async fn test_scenario_b_payment_covers_interest_then_principal() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let client = StandardClients::ordinary_1000(&ledger).await?;

    let result = ledger
        .apply_payment(PaymentRequest::new(client.id, 15_000))
        .await?;

    assert_eq!(result.allocation.to_interest, 10_000);
    assert_eq!(result.allocation.to_principal, 5_000);
    assert_eq!(result.client.balance, 95_000);
    assert_eq!(result.client.interest, 9_500);

    let stored = ledger.get_client(client.id).await?;
    assert_eq!(stored.balance, 95_000);
    assert_eq!(stored.interest, 9_500);

    Ok(())
}

#[tokio::test]
async fn test_scenario_c_credit_line_20_origination() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;

    let client = StandardClients::credit_line_20(&ledger).await?;

    assert_eq!(client.balance, 2_000_000);
    assert_eq!(client.interest, 65_000);

    Ok(())
}

#[tokio::test]
async fn test_scenario_d_payment_below_interest_carries_remainder() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let client = ledger
        .originate_loan(OriginationRequest::new("Luis", LoanCategory::Ordinary).with_amount(50_000))
        .await?;
    assert_eq!(client.interest, 5_000);

    let result = ledger
        .apply_payment(PaymentRequest::new(client.id, 3_000))
        .await?;

    // 20.00 carried plus 10% of the untouched 500.00 principal
    assert_eq!(result.client.balance, 50_000);
    assert_eq!(result.client.interest, 2_000 + 5_000);
    assert_eq!(result.allocation.interest_carried, 2_000);

    Ok(())
}

#[tokio::test]
async fn test_scenario_e_increase_on_missing_client() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let client = StandardClients::ordinary_1000(&ledger).await?;

    let err = ledger
        .apply_loan_action(LoanActionRequest::increase(999, 10_000))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::ClientNotFound(999)));

    // Nothing was written for anyone
    assert_eq!(ledger.store().count_history(999).await?, 0);
    assert_eq!(ledger.store().count_history(client.id).await?, 1);
    assert_eq!(ledger.get_client(client.id).await?, client);

    Ok(())
}

#[tokio::test]
async fn test_scenario_f_invalid_payment_amounts() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let client = StandardClients::ordinary_1000(&ledger).await?;

    for input in ["-5", "abc", "0", ""] {
        let err = PaymentRequest::parse(client.id, input).unwrap_err();
        assert!(
            matches!(err, LedgerError::InvalidAmount(_)),
            "expected InvalidAmount for {input:?}, got {err:?}"
        );
    }

    // Already-parsed negative amounts are rejected by the ledger too
    let err = ledger
        .apply_payment(PaymentRequest::new(client.id, -500))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));

    assert_eq!(ledger.get_client(client.id).await?, client);
    assert_eq!(ledger.store().count_payments(client.id).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_credit_lines_ignore_requested_amount() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;

    for requested in [None, Some(1), Some(5_000_000)] {
        let mut request = OriginationRequest::new("Line 10", LoanCategory::CreditLine10);
        request.requested_amount = requested;
        let client = ledger.originate_loan(request).await?;
        assert_eq!(client.balance, 1_000_000);
        assert_eq!(client.interest, 50_000);

        let mut request = OriginationRequest::new("Line 20", LoanCategory::CreditLine20);
        request.requested_amount = requested;
        let client = ledger.originate_loan(request).await?;
        assert_eq!(client.balance, 2_000_000);
        assert_eq!(client.interest, 65_000);
    }

    Ok(())
}

#[tokio::test]
async fn test_unknown_category_is_rejected() -> Result<()> {
    let err = parse_category("credit_line_30").unwrap_err();
    assert!(matches!(err, LedgerError::InvalidCategory(ref c) if c == "credit_line_30"));
    Ok(())
}

#[tokio::test]
async fn test_unknown_loan_action_is_rejected() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let client = StandardClients::ordinary_1000(&ledger).await?;

    let err = LoanActionRequest::parse(client.id, "refinance", "100").unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAction(ref a) if a == "refinance"));
    assert_eq!(ledger.store().count_history(client.id).await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_payment_on_missing_client() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;

    let err = ledger
        .apply_payment(PaymentRequest::new(42, 1_000))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::ClientNotFound(42)));
    assert_eq!(ledger.store().count_payments(42).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_overpayment_floors_principal_at_zero() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let client = StandardClients::ordinary_1000(&ledger).await?;

    let result = ledger
        .apply_payment(PaymentRequest::new(client.id, 500_000))
        .await?;

    assert_eq!(result.client.balance, 0);
    assert_eq!(result.client.interest, 0);
    assert_eq!(result.allocation.unapplied, 500_000 - 10_000 - 100_000);

    // The payment log keeps the amount as tendered
    let history = ledger.client_history(client.id).await?;
    assert_eq!(history.payments.len(), 1);
    assert_eq!(history.payments[0].amount, 500_000);

    Ok(())
}

#[tokio::test]
async fn test_interest_tracks_principal_after_full_interest_payments() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let client = StandardClients::credit_line_20(&ledger).await?;

    for payment in [65_000, 100_000, 250_000, 61_750] {
        let result = ledger
            .apply_payment(PaymentRequest::new(client.id, payment))
            .await?;
        let updated = result.client;
        assert_eq!(
            updated.interest,
            updated.category.interest_on(updated.balance),
            "interest drifted after paying {payment}"
        );
        assert!(updated.balance >= 0 && updated.interest >= 0);
    }

    Ok(())
}

#[tokio::test]
async fn test_renew_leaves_balance_untouched() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let client = StandardClients::ordinary_1000(&ledger).await?;

    let renewed = ledger
        .apply_loan_action(LoanActionRequest::renew(client.id, 30_000))
        .await?;

    assert_eq!(renewed.balance, client.balance);
    assert_eq!(renewed.interest, client.interest);

    let history = ledger.client_history(client.id).await?;
    assert_eq!(history.loan_history.len(), 2);
    let renewal = history
        .loan_history
        .iter()
        .find(|e| e.action == HistoryAction::Renewal)
        .expect("renewal entry");
    assert_eq!(renewal.amount, 30_000);

    Ok(())
}

#[tokio::test]
async fn test_increase_adds_principal_and_interest() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let client = StandardClients::ordinary_1000(&ledger).await?;

    let increased = ledger
        .apply_loan_action(LoanActionRequest::increase(client.id, 50_000))
        .await?;

    assert_eq!(increased.balance, 150_000);
    assert_eq!(increased.interest, 15_000);
    assert_eq!(increased.interest, increased.category.interest_on(increased.balance));

    // Increase on a credit line uses that line's rate
    let line = StandardClients::credit_line_20(&ledger).await?;
    let increased = ledger
        .apply_loan_action(LoanActionRequest::increase(line.id, 400_000))
        .await?;
    assert_eq!(increased.balance, 2_400_000);
    assert_eq!(increased.interest, 65_000 + 13_000);

    Ok(())
}

#[tokio::test]
async fn test_increase_requires_positive_amount() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let client = StandardClients::ordinary_1000(&ledger).await?;

    for amount in [0, -100] {
        let err = ledger
            .apply_loan_action(LoanActionRequest::increase(client.id, amount))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
    }
    assert_eq!(ledger.get_client(client.id).await?, client);
    assert_eq!(ledger.store().count_history(client.id).await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_increase_past_representable_balance_is_rejected() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let huge = parse_amount("92233720368547758")?;
    let client = ledger
        .originate_loan(OriginationRequest::new("Pedro Ruiz", LoanCategory::Ordinary).with_amount(huge))
        .await?;

    let err = ledger
        .apply_loan_action(LoanActionRequest::increase(client.id, huge))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));

    assert_eq!(ledger.get_client(client.id).await?, client);
    assert_eq!(ledger.store().count_history(client.id).await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_audit_logs_grow_by_one_per_successful_call() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let client = StandardClients::ordinary_1000(&ledger).await?;
    let store = ledger.store();

    assert_eq!(store.count_history(client.id).await?, 1);
    assert_eq!(store.count_payments(client.id).await?, 0);

    ledger
        .apply_payment(PaymentRequest::new(client.id, 2_000))
        .await?;
    assert_eq!(store.count_payments(client.id).await?, 1);

    ledger
        .apply_loan_action(LoanActionRequest::renew(client.id, 0))
        .await?;
    assert_eq!(store.count_history(client.id).await?, 2);

    ledger
        .apply_loan_action(LoanActionRequest::increase(client.id, 1_000))
        .await?;
    assert_eq!(store.count_history(client.id).await?, 3);

    // Failures leave both logs alone
    let _ = ledger
        .apply_payment(PaymentRequest::new(client.id, 0))
        .await
        .unwrap_err();
    let _ = ledger
        .apply_loan_action(LoanActionRequest::increase(client.id, -1))
        .await
        .unwrap_err();
    assert_eq!(store.count_payments(client.id).await?, 1);
    assert_eq!(store.count_history(client.id).await?, 3);

    Ok(())
}

#[tokio::test]
async fn test_client_history_on_missing_client() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;

    let err = ledger.client_history(7).await.unwrap_err();
    assert!(matches!(err, LedgerError::ClientNotFound(7)));

    Ok(())
}

#[tokio::test]
async fn test_list_clients_and_directory() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    assert!(ledger.list_clients().await?.is_empty());

    let first = StandardClients::ordinary_1000(&ledger).await?;
    let second = StandardClients::credit_line_20(&ledger).await?;

    let clients = ledger.list_clients().await?;
    assert_eq!(clients, vec![first.clone(), second.clone()]);

    let labels: Vec<String> = ledger
        .client_directory()
        .await?
        .iter()
        .map(|l| l.to_string())
        .collect();
    assert_eq!(
        labels,
        vec![
            format!("{} - Maria Lopez", first.id),
            format!("{} - Jorge Diaz", second.id),
        ]
    );

    // Directory and list come from the same store
    assert_eq!(ledger.store().list_clients().await?.len(), 2);

    Ok(())
}
