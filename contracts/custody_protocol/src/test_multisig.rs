extern crate std;

use soroban_sdk::{
    testutils::{Address as _, Ledger},
    Address, String,
};

use crate::invariants;
use crate::test::{Fixture, MIN_CAPITAL, USDT};
use crate::{Error, QuorumPolicy, TransactionStatus};

const VALUE: i128 = 100 * USDT;

/// Default project with three non-owner financiers of 100 USDT each.
fn funded_project(f: &Fixture) -> (u64, Address, Address, Address) {
    let id = f.default_project();
    let a = f.new_financier(id, MIN_CAPITAL);
    let b = f.new_financier(id, MIN_CAPITAL);
    let c = f.new_financier(id, MIN_CAPITAL);
    (id, a, b, c)
}

#[test]
fn test_create_transaction_appends_pending_entry() {
    let f = Fixture::new();
    let (id, ..) = funded_project(&f);
    let recipient = Address::generate(&f.env);

    assert_eq!(f.client.get_transaction_count(&id), 0);
    let index = f.client.create_transaction(&id, &f.owner, &recipient, &VALUE);
    assert_eq!(index, 0);
    assert_eq!(f.client.create_transaction(&id, &f.owner, &recipient, &USDT), 1);
    assert_eq!(f.client.get_transaction_count(&id), 2);

    let tx = f.client.get_transaction(&id, &index);
    assert_eq!(tx.to, recipient);
    assert_eq!(tx.value, VALUE);
    assert!(!tx.executed);
    assert_eq!(tx.num_confirmations, 0);
    assert_eq!(tx.status, TransactionStatus::Pending);
    invariants::assert_transaction_consistent(&tx);
}

#[test]
fn test_create_transaction_is_owner_only() {
    let f = Fixture::new();
    let (id, a, ..) = funded_project(&f);
    let recipient = Address::generate(&f.env);

    assert_eq!(
        f.client.try_create_transaction(&id, &a, &recipient, &VALUE),
        Err(Ok(Error::NotOwner))
    );
    assert_eq!(
        f.client.try_create_transaction(&id, &f.owner, &recipient, &0),
        Err(Ok(Error::InvalidAmount))
    );
    assert_eq!(f.client.get_transaction_count(&id), 0);
}

#[test]
fn test_create_transaction_does_not_check_balance() {
    let f = Fixture::new();
    let id = f.default_project();
    let recipient = Address::generate(&f.env);

    let index = f.client.create_transaction(&id, &f.owner, &recipient, &(1_000 * USDT));
    assert_eq!(f.client.get_transaction(&id, &index).status, TransactionStatus::Pending);
}

#[test]
fn test_owner_cannot_sign() {
    let f = Fixture::new();
    let (id, ..) = funded_project(&f);
    let recipient = Address::generate(&f.env);
    let index = f.client.create_transaction(&id, &f.owner, &recipient, &VALUE);

    assert_eq!(
        f.client.try_sign_transaction(&id, &f.owner, &index),
        Err(Ok(Error::IsOwner))
    );
}

#[test]
fn test_owner_cannot_sign_even_as_financier() {
    let f = Fixture::new();
    let (id, ..) = funded_project(&f);
    f.fund(id, &f.owner, MIN_CAPITAL);
    let recipient = Address::generate(&f.env);
    let index = f.client.create_transaction(&id, &f.owner, &recipient, &VALUE);

    assert_eq!(
        f.client.try_sign_transaction(&id, &f.owner, &index),
        Err(Ok(Error::IsOwner))
    );
}

#[test]
fn test_non_financier_cannot_sign() {
    let f = Fixture::new();
    let (id, ..) = funded_project(&f);
    let recipient = Address::generate(&f.env);
    let index = f.client.create_transaction(&id, &f.owner, &recipient, &VALUE);

    let outsider = Address::generate(&f.env);
    assert_eq!(
        f.client.try_sign_transaction(&id, &outsider, &index),
        Err(Ok(Error::NotFinancier))
    );
}

#[test]
fn test_sign_missing_transaction_fails() {
    let f = Fixture::new();
    let (id, a, ..) = funded_project(&f);

    assert_eq!(
        f.client.try_sign_transaction(&id, &a, &0),
        Err(Ok(Error::TransactionNotExist))
    );
    assert_eq!(
        f.client.try_execute_transaction(&id, &f.owner, &3),
        Err(Ok(Error::TransactionNotExist))
    );
    assert_eq!(
        f.client.try_revoke_transaction(&id, &f.owner, &3),
        Err(Ok(Error::TransactionNotExist))
    );
    assert_eq!(
        f.client.try_get_transaction(&id, &0),
        Err(Ok(Error::TransactionNotExist))
    );
}

#[test]
fn test_double_sign_fails() {
    let f = Fixture::new();
    let (id, a, b, _) = funded_project(&f);
    let recipient = Address::generate(&f.env);
    let index = f.client.create_transaction(&id, &f.owner, &recipient, &VALUE);

    assert!(!f.client.is_transaction_signed_by(&id, &a, &index));
    assert_eq!(f.client.sign_transaction(&id, &a, &index), 1);
    assert!(f.client.is_transaction_signed_by(&id, &a, &index));
    assert!(!f.client.is_transaction_signed_by(&id, &b, &index));

    assert_eq!(
        f.client.try_sign_transaction(&id, &a, &index),
        Err(Ok(Error::TransactionAlreadyConfirmed))
    );

    let tx = f.client.get_transaction(&id, &index);
    assert_eq!(tx.num_confirmations, 1);
    assert_eq!(tx.confirmed_by.len(), 1);
    invariants::assert_transaction_consistent(&tx);
}

#[test]
fn test_execute_below_quorum_fails() {
    let f = Fixture::new();
    let (id, a, ..) = funded_project(&f);
    let recipient = Address::generate(&f.env);
    let index = f.client.create_transaction(&id, &f.owner, &recipient, &VALUE);

    assert_eq!(
        f.client.try_execute_transaction(&id, &f.owner, &index),
        Err(Ok(Error::TransactionNotEnoughConfirmations))
    );

    f.client.sign_transaction(&id, &a, &index);
    assert_eq!(
        f.client.try_execute_transaction(&id, &f.owner, &index),
        Err(Ok(Error::TransactionNotEnoughConfirmations))
    );
    assert_eq!(f.client.get_usdt_balance(&id), 3 * MIN_CAPITAL);
}

#[test]
fn test_execute_with_quorum_pays_recipient() {
    let f = Fixture::new();
    let (id, a, b, c) = funded_project(&f);
    let recipient = Address::generate(&f.env);
    let before = f.client.get_project(&id);
    let index = f.client.create_transaction(&id, &f.owner, &recipient, &VALUE);

    f.client.sign_transaction(&id, &a, &index);
    assert_eq!(f.client.sign_transaction(&id, &b, &index), 2);
    f.client.execute_transaction(&id, &f.owner, &index);

    let tx = f.client.get_transaction(&id, &index);
    assert!(tx.executed);
    assert_eq!(tx.status, TransactionStatus::Executed);
    invariants::assert_transaction_consistent(&tx);
    invariants::assert_valid_transaction_transition(&TransactionStatus::Pending, &tx.status);

    assert_eq!(f.token.balance(&recipient), VALUE);
    assert_eq!(f.client.get_usdt_balance(&id), 3 * MIN_CAPITAL - VALUE);
    assert_eq!(f.token.balance(&f.client.address), 3 * MIN_CAPITAL - VALUE);
    // Spending does not rewrite contribution history.
    assert_eq!(f.client.get_total_invested(&id), 3 * MIN_CAPITAL);

    let after = f.client.get_project(&id);
    invariants::assert_project_immutable_fields(&before, &after);
    invariants::assert_total_monotonic(&before, &after);
    invariants::assert_all_project_invariants(&f.client, id);

    assert_eq!(
        f.client.try_sign_transaction(&id, &c, &index),
        Err(Ok(Error::TransactionAlreadyExecuted))
    );
    assert_eq!(
        f.client.try_execute_transaction(&id, &f.owner, &index),
        Err(Ok(Error::TransactionAlreadyExecuted))
    );
    assert_eq!(
        f.client.try_revoke_transaction(&id, &f.owner, &index),
        Err(Ok(Error::TransactionAlreadyExecuted))
    );
    assert_eq!(f.token.balance(&recipient), VALUE);
}

#[test]
fn test_execute_is_owner_only() {
    let f = Fixture::new();
    let (id, a, b, _) = funded_project(&f);
    let recipient = Address::generate(&f.env);
    let index = f.client.create_transaction(&id, &f.owner, &recipient, &VALUE);
    f.client.sign_transaction(&id, &a, &index);
    f.client.sign_transaction(&id, &b, &index);

    assert_eq!(
        f.client.try_execute_transaction(&id, &a, &index),
        Err(Ok(Error::NotOwner))
    );
    assert_eq!(f.client.get_transaction(&id, &index).status, TransactionStatus::Pending);
}

#[test]
fn test_execute_beyond_custody_fails() {
    let f = Fixture::new();
    let (id, a, b, _) = funded_project(&f);
    let recipient = Address::generate(&f.env);
    let index = f
        .client
        .create_transaction(&id, &f.owner, &recipient, &(3 * MIN_CAPITAL + 1));
    f.client.sign_transaction(&id, &a, &index);
    f.client.sign_transaction(&id, &b, &index);

    assert_eq!(
        f.client.try_execute_transaction(&id, &f.owner, &index),
        Err(Ok(Error::InsufficientBalance))
    );
    assert!(!f.client.get_transaction(&id, &index).executed);
    assert_eq!(f.token.balance(&recipient), 0);
}

#[test]
fn test_execute_cannot_spend_another_projects_pool() {
    let f = Fixture::new();
    let (rich, ..) = funded_project(&f);
    let poor = f.create_project(None, None, QuorumPolicy::Fixed(1));
    let signer = f.new_financier(poor, MIN_CAPITAL);
    let recipient = Address::generate(&f.env);

    let index = f.client.create_transaction(&poor, &f.owner, &recipient, &(2 * MIN_CAPITAL));
    f.client.sign_transaction(&poor, &signer, &index);
    assert_eq!(
        f.client.try_execute_transaction(&poor, &f.owner, &index),
        Err(Ok(Error::InsufficientBalance))
    );
    assert_eq!(f.client.get_usdt_balance(&rich), 3 * MIN_CAPITAL);
    invariants::assert_vault_covers_projects(&f.client);
}

#[test]
fn test_revoke_blocks_sign_and_execute() {
    let f = Fixture::new();
    let (id, a, b, _) = funded_project(&f);
    let recipient = Address::generate(&f.env);
    let index = f.client.create_transaction(&id, &f.owner, &recipient, &VALUE);
    f.client.sign_transaction(&id, &a, &index);

    f.client.revoke_transaction(&id, &f.owner, &index);
    let tx = f.client.get_transaction(&id, &index);
    assert_eq!(tx.status, TransactionStatus::Revoked);
    assert!(!tx.executed);
    invariants::assert_transaction_consistent(&tx);

    assert_eq!(
        f.client.try_sign_transaction(&id, &b, &index),
        Err(Ok(Error::TransactionNotPending))
    );
    assert_eq!(
        f.client.try_execute_transaction(&id, &f.owner, &index),
        Err(Ok(Error::TransactionNotPending))
    );
    assert_eq!(
        f.client.try_revoke_transaction(&id, &f.owner, &index),
        Err(Ok(Error::TransactionNotPending))
    );
    assert_eq!(f.client.get_usdt_balance(&id), 3 * MIN_CAPITAL);
}

#[test]
fn test_revoke_is_owner_only() {
    let f = Fixture::new();
    let (id, a, ..) = funded_project(&f);
    let recipient = Address::generate(&f.env);
    let index = f.client.create_transaction(&id, &f.owner, &recipient, &VALUE);

    assert_eq!(
        f.client.try_revoke_transaction(&id, &a, &index),
        Err(Ok(Error::NotOwner))
    );
    assert_eq!(f.client.get_transaction(&id, &index).status, TransactionStatus::Pending);
}

#[test]
fn test_transactions_are_independent() {
    let f = Fixture::new();
    let (id, a, b, _) = funded_project(&f);
    let recipient = Address::generate(&f.env);
    let first = f.client.create_transaction(&id, &f.owner, &recipient, &VALUE);
    let second = f.client.create_transaction(&id, &f.owner, &recipient, &VALUE);

    f.client.revoke_transaction(&id, &f.owner, &first);
    f.client.sign_transaction(&id, &a, &second);
    f.client.sign_transaction(&id, &b, &second);
    f.client.execute_transaction(&id, &f.owner, &second);

    assert_eq!(f.client.get_transaction(&id, &first).status, TransactionStatus::Revoked);
    assert_eq!(f.client.get_transaction(&id, &second).status, TransactionStatus::Executed);
    assert_eq!(f.token.balance(&recipient), VALUE);
}

#[test]
fn test_majority_quorum_tracks_financiers() {
    let f = Fixture::new();
    let id = f.create_project(None, None, QuorumPolicy::Majority);
    assert_eq!(f.client.get_required_confirmations(&id), 1);

    // The owner's own contribution does not count toward the quorum base.
    f.fund(id, &f.owner, MIN_CAPITAL);
    assert_eq!(f.client.get_required_confirmations(&id), 1);

    let signers = [
        f.new_financier(id, MIN_CAPITAL),
        f.new_financier(id, MIN_CAPITAL),
        f.new_financier(id, MIN_CAPITAL),
        f.new_financier(id, MIN_CAPITAL),
    ];
    assert_eq!(f.client.get_required_confirmations(&id), 3);

    let recipient = Address::generate(&f.env);
    let index = f.client.create_transaction(&id, &f.owner, &recipient, &VALUE);
    f.client.sign_transaction(&id, &signers[0], &index);
    f.client.sign_transaction(&id, &signers[1], &index);
    assert_eq!(
        f.client.try_execute_transaction(&id, &f.owner, &index),
        Err(Ok(Error::TransactionNotEnoughConfirmations))
    );

    f.client.sign_transaction(&id, &signers[2], &index);
    f.client.execute_transaction(&id, &f.owner, &index);
    assert_eq!(f.token.balance(&recipient), VALUE);
}

#[test]
fn test_fixed_quorum_is_constant() {
    let f = Fixture::new();
    let (id, ..) = funded_project(&f);
    assert_eq!(f.client.get_required_confirmations(&id), 2);
    f.new_financier(id, MIN_CAPITAL);
    f.new_financier(id, MIN_CAPITAL);
    assert_eq!(f.client.get_required_confirmations(&id), 2);
}

#[test]
fn test_transaction_status_labels() {
    let f = Fixture::new();
    assert_eq!(
        f.client.transaction_status_label(&TransactionStatus::Pending),
        String::from_str(&f.env, "Pending")
    );
    assert_eq!(
        f.client.transaction_status_label(&TransactionStatus::Executed),
        String::from_str(&f.env, "Executed")
    );
    assert_eq!(
        f.client.transaction_status_label(&TransactionStatus::Revoked),
        String::from_str(&f.env, "Revoked")
    );
}

#[test]
fn test_multisig_works_after_project_expires() {
    let f = Fixture::new();
    let (id, a, b, _) = funded_project(&f);
    let expiration = f.client.get_expiration(&id).unwrap();
    f.env.ledger().set_timestamp(expiration + 1);
    f.client.change_status(&id);

    let recipient = Address::generate(&f.env);
    let index = f.client.create_transaction(&id, &f.owner, &recipient, &VALUE);
    f.client.sign_transaction(&id, &a, &index);
    f.client.sign_transaction(&id, &b, &index);
    f.client.execute_transaction(&id, &f.owner, &index);
    assert_eq!(f.token.balance(&recipient), VALUE);
}
