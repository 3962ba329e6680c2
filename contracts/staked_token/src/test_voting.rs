extern crate std;

use ed25519_dalek::{Signer, SigningKey};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::StellarAssetClient,
    Address, Bytes, BytesN, Env,
};

use crate::{voting, voting::PowerType, ContractError, StakedTokenContract, StakedTokenContractClient};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn setup() -> (Env, StakedTokenContractClient<'static>, Address) {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_sequence_number(1);

    let governance_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let contract_id = env.register(StakedTokenContract, ());
    let client = StakedTokenContractClient::new(&env, &contract_id);
    client.initialize(
        &Address::generate(&env),
        &governance_token,
        &Address::generate(&env),
        &864_000,
        &172_800,
    );

    (env, client, governance_token)
}

fn stake(env: &Env, client: &StakedTokenContractClient, token: &Address, user: &Address, amount: i128) {
    StellarAssetClient::new(env, token).mint(user, &amount);
    client.stake(user, user, &amount);
}

fn sign(key: &SigningKey, message: &Bytes) -> BytesN<64> {
    let mut buf = std::vec![0u8; message.len() as usize];
    message.copy_into_slice(&mut buf);
    BytesN::from_array(message.env(), &key.sign(&buf).to_bytes())
}

/// Register a deterministic ed25519 key for `owner` and return it.
fn register_key(env: &Env, client: &StakedTokenContractClient, owner: &Address, seed: u8) -> SigningKey {
    let key = SigningKey::from_bytes(&[seed; 32]);
    let public_key = BytesN::from_array(env, &key.verifying_key().to_bytes());
    let message = voting::key_registration_message(env, &client.address, owner);
    client.register_signing_key(owner, &public_key, &sign(&key, &message));
    key
}

fn public_key(env: &Env, key: &SigningKey) -> BytesN<32> {
    BytesN::from_array(env, &key.verifying_key().to_bytes())
}

fn power(client: &StakedTokenContractClient, user: &Address) -> (i128, i128) {
    (
        client.get_power_current(user, &PowerType::Voting),
        client.get_power_current(user, &PowerType::Proposition),
    )
}

// ── Power tracking ───────────────────────────────────────────────────────────

#[test]
fn test_stake_gives_power_on_both_tracks() {
    let (env, client, token) = setup();
    let user = Address::generate(&env);
    stake(&env, &client, &token, &user, 1_000);

    assert_eq!(power(&client, &user), (1_000, 1_000));
    assert_eq!(client.get_delegatee_by_type(&user, &PowerType::Voting), user);
}

#[test]
fn test_transfer_moves_power() {
    let (env, client, token) = setup();
    let alice = Address::generate(&env);
    let bob = Address::generate(&env);
    stake(&env, &client, &token, &alice, 1_000);

    client.transfer(&alice, &bob, &400);

    assert_eq!(power(&client, &alice), (600, 600));
    assert_eq!(power(&client, &bob), (400, 400));
}

#[test]
fn test_delegate_moves_both_tracks() {
    let (env, client, token) = setup();
    let delegator = Address::generate(&env);
    let delegatee = Address::generate(&env);
    stake(&env, &client, &token, &delegator, 1_000);

    client.delegate(&delegator, &delegatee);

    assert_eq!(power(&client, &delegator), (0, 0));
    assert_eq!(power(&client, &delegatee), (1_000, 1_000));
    assert_eq!(
        client.get_delegatee_by_type(&delegator, &PowerType::Proposition),
        delegatee
    );

    // Later stake follows the delegation.
    stake(&env, &client, &token, &delegator, 500);
    assert_eq!(power(&client, &delegatee), (1_500, 1_500));
    assert_eq!(client.balance(&delegatee), 0);
}

#[test]
fn test_delegate_by_type_moves_one_track() {
    let (env, client, token) = setup();
    let delegator = Address::generate(&env);
    let delegatee = Address::generate(&env);
    stake(&env, &client, &token, &delegator, 1_000);

    client.delegate_by_type(&delegator, &delegatee, &PowerType::Voting);

    assert_eq!(power(&client, &delegator), (0, 1_000));
    assert_eq!(power(&client, &delegatee), (1_000, 0));
}

#[test]
fn test_delegating_back_to_self_restores_power() {
    let (env, client, token) = setup();
    let delegator = Address::generate(&env);
    let delegatee = Address::generate(&env);
    stake(&env, &client, &token, &delegator, 1_000);

    client.delegate(&delegator, &delegatee);
    client.delegate(&delegator, &delegator);

    assert_eq!(power(&client, &delegator), (1_000, 1_000));
    assert_eq!(power(&client, &delegatee), (0, 0));
}

#[test]
fn test_transfer_between_holders_of_same_delegatee_keeps_power() {
    let (env, client, token) = setup();
    let alice = Address::generate(&env);
    let bob = Address::generate(&env);
    let delegatee = Address::generate(&env);
    stake(&env, &client, &token, &alice, 1_000);
    client.delegate(&alice, &delegatee);
    client.delegate(&bob, &delegatee);

    env.ledger().set_sequence_number(5);
    client.transfer(&alice, &bob, &1_000);

    assert_eq!(power(&client, &delegatee), (1_000, 1_000));
    assert_eq!(client.get_snapshot_count(&delegatee, &PowerType::Voting), 1);
}

// ── Snapshots ────────────────────────────────────────────────────────────────

#[test]
fn test_power_at_reads_history() {
    let (env, client, token) = setup();
    let user = Address::generate(&env);
    let other = Address::generate(&env);

    env.ledger().set_sequence_number(10);
    stake(&env, &client, &token, &user, 100);
    env.ledger().set_sequence_number(20);
    stake(&env, &client, &token, &user, 50);
    env.ledger().set_sequence_number(30);
    client.transfer(&user, &other, &150);

    let at = |ledger: u32| client.get_power_at(&user, &PowerType::Voting, &ledger);
    assert_eq!(at(5), 0);
    assert_eq!(at(10), 100);
    assert_eq!(at(15), 100);
    assert_eq!(at(20), 150);
    assert_eq!(at(29), 150);
    assert_eq!(at(30), 0);
    assert_eq!(client.get_snapshot_count(&user, &PowerType::Voting), 3);
}

#[test]
fn test_power_at_future_ledger_fails() {
    let (env, client, _token) = setup();
    let user = Address::generate(&env);
    env.ledger().set_sequence_number(30);

    match client.try_get_power_at(&user, &PowerType::Voting, &31) {
        Err(Ok(e)) => assert_eq!(e, ContractError::InvalidInput),
        _ => unreachable!("Expected InvalidInput error"),
    }
    assert_eq!(client.get_power_at(&user, &PowerType::Voting, &30), 0);
}

#[test]
fn test_same_ledger_moves_overwrite_snapshot() {
    let (env, client, token) = setup();
    let user = Address::generate(&env);

    env.ledger().set_sequence_number(10);
    stake(&env, &client, &token, &user, 100);
    stake(&env, &client, &token, &user, 100);

    assert_eq!(client.get_snapshot_count(&user, &PowerType::Voting), 1);
    assert_eq!(client.get_power_at(&user, &PowerType::Voting, &10), 200);
}

// ── Delegation by signature ──────────────────────────────────────────────────

#[test]
fn test_delegate_by_sig() {
    let (env, client, token) = setup();
    let owner = Address::generate(&env);
    let delegatee = Address::generate(&env);
    stake(&env, &client, &token, &owner, 1_000);
    let key = register_key(&env, &client, &owner, 7);

    let expiry = env.ledger().timestamp() + 1_000;
    let message = voting::delegation_message(&env, &client.address, &delegatee, None, 0, expiry);
    client.delegate_by_sig(&public_key(&env, &key), &delegatee, &0, &expiry, &sign(&key, &message));

    assert_eq!(power(&client, &delegatee), (1_000, 1_000));
    assert_eq!(client.get_nonce(&owner), 1);

    // Replaying the same signature is rejected.
    match client.try_delegate_by_sig(
        &public_key(&env, &key),
        &delegatee,
        &0,
        &expiry,
        &sign(&key, &message),
    ) {
        Err(Ok(e)) => assert_eq!(e, ContractError::InvalidNonce),
        _ => unreachable!("Expected InvalidNonce error"),
    }
    assert_eq!(client.get_nonce(&owner), 1);
}

#[test]
fn test_delegate_by_type_by_sig() {
    let (env, client, token) = setup();
    let owner = Address::generate(&env);
    let delegatee = Address::generate(&env);
    stake(&env, &client, &token, &owner, 1_000);
    let key = register_key(&env, &client, &owner, 9);

    let expiry = env.ledger().timestamp() + 1_000;
    let message = voting::delegation_message(
        &env,
        &client.address,
        &delegatee,
        Some(PowerType::Proposition),
        0,
        expiry,
    );
    client.delegate_by_type_by_sig(
        &public_key(&env, &key),
        &delegatee,
        &PowerType::Proposition,
        &0,
        &expiry,
        &sign(&key, &message),
    );

    assert_eq!(power(&client, &owner), (1_000, 0));
    assert_eq!(power(&client, &delegatee), (0, 1_000));
}

#[test]
fn test_delegate_by_sig_expired() {
    let (env, client, token) = setup();
    let owner = Address::generate(&env);
    let delegatee = Address::generate(&env);
    stake(&env, &client, &token, &owner, 1_000);
    let key = register_key(&env, &client, &owner, 11);

    env.ledger().set_timestamp(5_000);
    let expiry = 4_999;
    let message = voting::delegation_message(&env, &client.address, &delegatee, None, 0, expiry);

    match client.try_delegate_by_sig(
        &public_key(&env, &key),
        &delegatee,
        &0,
        &expiry,
        &sign(&key, &message),
    ) {
        Err(Ok(e)) => assert_eq!(e, ContractError::Expired),
        _ => unreachable!("Expected Expired error"),
    }
    assert_eq!(client.get_nonce(&owner), 0);
    assert_eq!(power(&client, &owner), (1_000, 1_000));
}

#[test]
fn test_delegate_by_sig_with_unregistered_key_fails() {
    let (env, client, _token) = setup();
    let delegatee = Address::generate(&env);
    let key = SigningKey::from_bytes(&[13; 32]);

    let message = voting::delegation_message(&env, &client.address, &delegatee, None, 0, 1_000);
    match client.try_delegate_by_sig(
        &public_key(&env, &key),
        &delegatee,
        &0,
        &1_000,
        &sign(&key, &message),
    ) {
        Err(Ok(e)) => assert_eq!(e, ContractError::InvalidSignature),
        _ => unreachable!("Expected InvalidSignature error"),
    }
}

#[test]
#[should_panic]
fn test_delegate_by_sig_with_foreign_signature_panics() {
    let (env, client, token) = setup();
    let owner = Address::generate(&env);
    let delegatee = Address::generate(&env);
    stake(&env, &client, &token, &owner, 1_000);
    let key = register_key(&env, &client, &owner, 15);
    let intruder = SigningKey::from_bytes(&[16; 32]);

    let message = voting::delegation_message(&env, &client.address, &delegatee, None, 0, 1_000);
    client.delegate_by_sig(
        &public_key(&env, &key),
        &delegatee,
        &0,
        &1_000,
        &sign(&intruder, &message),
    );
}

#[test]
#[should_panic]
fn test_register_signing_key_requires_proof_of_possession() {
    let (env, client, _token) = setup();
    let owner = Address::generate(&env);
    let key = SigningKey::from_bytes(&[17; 32]);

    // Signed for a different owner.
    let message = voting::key_registration_message(&env, &client.address, &Address::generate(&env));
    client.register_signing_key(&owner, &public_key(&env, &key), &sign(&key, &message));
}
