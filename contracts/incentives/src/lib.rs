#![no_std]

//! Multi-asset incentives controller.
//!
//! Interest-bearing assets report every balance change of their holders
//! through [`IncentivesContract::handle_action`]. Rewards accrue into a single
//! unclaimed ledger per user, and claims are paid by staking governance tokens
//! from the rewards vault into the staked token on behalf of the recipient.

pub mod events;

use common::{distribution, math::MAX_BPS, AssetDistribution, CommonError, UserAssetStake};
use soroban_sdk::{
    auth::{ContractContext, InvokerContractAuthEntry, SubContractInvocation},
    contract, contractclient, contractimpl, contracttype, symbol_short, token, vec, Address, Env,
    IntoVal, Symbol, Vec,
};

// ── Storage key constants ────────────────────────────────────────────────────

const CONFIG: Symbol = symbol_short!("CONFIG");
const UNCLAIMED: Symbol = symbol_short!("UNCLAIMED");
const CLAIMER: Symbol = symbol_short!("CLAIMER");

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidInput = 4,
    InvalidConfig = 5,
    MathOverflow = 6,
}

impl From<CommonError> for ContractError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::NotInitialized => ContractError::NotInitialized,
            CommonError::AlreadyInitialized => ContractError::AlreadyInitialized,
            CommonError::AccessDenied => ContractError::Unauthorized,
            CommonError::InvalidConfig => ContractError::InvalidConfig,
            CommonError::MathOverflow => ContractError::MathOverflow,
            CommonError::InvalidInput | CommonError::InvalidNonce | CommonError::NonceOverflow => {
                ContractError::InvalidInput
            }
        }
    }
}

// ── External interfaces ──────────────────────────────────────────────────────

/// Asset that reports scaled balances of its holders.
#[contractclient(name = "ScaledBalanceSourceClient")]
pub trait ScaledBalanceSource {
    /// `(scaled balance of user, scaled total supply)`.
    fn scaled_balance_and_supply(env: Env, user: Address) -> (i128, i128);
    fn scaled_total_supply(env: Env) -> i128;
}

/// The part of the staked token used to pay claims.
#[contractclient(name = "StakedTokenClient")]
pub trait StakedToken {
    fn stake(env: Env, staker: Address, on_behalf_of: Address, amount: i128);
}

// ── Public-facing types ──────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IncentivesConfig {
    pub emission_manager: Address,
    /// Staked token claims are paid into.
    pub staked_token: Address,
    /// Token held by the vault and staked for the recipient.
    pub governance_token: Address,
    /// Holder of reward funds; must approve this contract.
    pub rewards_vault: Address,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct IncentivesContract;

#[contractimpl]
impl IncentivesContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    pub fn initialize(
        env: Env,
        emission_manager: Address,
        staked_token: Address,
        governance_token: Address,
        rewards_vault: Address,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&CONFIG) {
            return Err(ContractError::AlreadyInitialized);
        }

        let config = IncentivesConfig {
            emission_manager: emission_manager.clone(),
            staked_token: staked_token.clone(),
            governance_token: governance_token.clone(),
            rewards_vault: rewards_vault.clone(),
        };
        env.storage().instance().set(&CONFIG, &config);

        events::publish_initialized(
            &env,
            emission_manager,
            staked_token,
            governance_token,
            rewards_vault,
        );
        Ok(())
    }

    // ── Admin functions ──────────────────────────────────────────────────────

    /// Configure several assets at once from parallel arrays.
    ///
    /// Each asset's index is settled against its current scaled total
    /// supply before the new schedule applies.
    pub fn configure_assets(
        env: Env,
        caller: Address,
        assets: Vec<Address>,
        emission_schedules: Vec<Vec<i128>>,
        share_ratios: Vec<u32>,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        Self::require_emission_manager(&env, &caller)?;

        if assets.len() != emission_schedules.len() || assets.len() != share_ratios.len() {
            return Err(ContractError::InvalidInput);
        }
        if share_ratios.iter().any(|ratio| ratio > MAX_BPS) {
            return Err(ContractError::InvalidConfig);
        }

        let now = env.ledger().timestamp();
        for (position, asset) in assets.iter().enumerate() {
            let position = position as u32;
            let (Some(schedule), Some(share_ratio)) =
                (emission_schedules.get(position), share_ratios.get(position))
            else {
                return Err(ContractError::InvalidInput);
            };
            let total_staked = ScaledBalanceSourceClient::new(&env, &asset).scaled_total_supply();
            distribution::configure_asset(&env, &asset, schedule, share_ratio, total_staked, now)?;
        }
        Ok(())
    }

    pub fn set_distribution_start(
        env: Env,
        caller: Address,
        asset: Address,
        distribution_start: u64,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        Self::require_emission_manager(&env, &caller)?;

        let total_staked = ScaledBalanceSourceClient::new(&env, &asset).scaled_total_supply();
        distribution::set_distribution_start(
            &env,
            &asset,
            distribution_start,
            total_staked,
            env.ledger().timestamp(),
        )?;
        Ok(())
    }

    /// Authorise `claimer` to claim on behalf of `user`. Replaces any
    /// previous claimer.
    pub fn set_claimer(
        env: Env,
        caller: Address,
        user: Address,
        claimer: Address,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        Self::require_emission_manager(&env, &caller)?;

        env.storage()
            .persistent()
            .set(&(CLAIMER, user.clone()), &claimer);
        events::publish_claimer_set(&env, user, claimer);
        Ok(())
    }

    // ── Accrual ─────────────────────────────────────────────────────────────

    /// Called by a reporting asset before it changes `user`'s balance.
    ///
    /// `total_supply` and `user_balance` are the asset's scaled values prior
    /// to the change.
    pub fn handle_action(
        env: Env,
        asset: Address,
        user: Address,
        total_supply: i128,
        user_balance: i128,
    ) -> Result<(), ContractError> {
        asset.require_auth();
        if total_supply < 0 || user_balance < 0 {
            return Err(ContractError::InvalidInput);
        }

        let accrued = distribution::update_user_accrual(
            &env,
            &asset,
            &user,
            user_balance,
            total_supply,
            env.ledger().timestamp(),
        )?;
        if accrued != 0 {
            Self::add_unclaimed(&env, &user, accrued)?;
            events::publish_rewards_accrued(&env, user, accrued);
        }
        Ok(())
    }

    // ── Claims ──────────────────────────────────────────────────────────────

    /// Claim up to `amount` of `user`'s rewards across `assets`, staked on
    /// behalf of `to`. Returns the amount claimed.
    pub fn claim_rewards(
        env: Env,
        user: Address,
        assets: Vec<Address>,
        amount: i128,
        to: Address,
    ) -> Result<i128, ContractError> {
        user.require_auth();
        Self::claim(&env, &assets, amount, &user, &to, &user)
    }

    /// Claim for `user` as their authorised claimer.
    pub fn claim_rewards_on_behalf(
        env: Env,
        claimer: Address,
        assets: Vec<Address>,
        amount: i128,
        user: Address,
        to: Address,
    ) -> Result<i128, ContractError> {
        claimer.require_auth();
        if Self::get_claimer(env.clone(), user.clone()) != Some(claimer.clone()) {
            return Err(ContractError::Unauthorized);
        }
        Self::claim(&env, &assets, amount, &user, &to, &claimer)
    }

    // ── View functions ───────────────────────────────────────────────────────

    pub fn get_config(env: Env) -> Result<IncentivesConfig, ContractError> {
        Self::load_config(&env)
    }

    /// Unclaimed rewards plus everything `user` would accrue on `assets`
    /// if settled now.
    pub fn get_rewards_balance(
        env: Env,
        assets: Vec<Address>,
        user: Address,
    ) -> Result<i128, ContractError> {
        let mut stakes = Vec::new(&env);
        for asset in assets.iter() {
            let (staked_by_user, total_staked) =
                ScaledBalanceSourceClient::new(&env, &asset).scaled_balance_and_supply(&user);
            stakes.push_back(UserAssetStake {
                asset,
                staked_by_user,
                total_staked,
            });
        }
        let pending =
            distribution::preview_unclaimed(&env, &user, &stakes, env.ledger().timestamp())?;
        Self::unclaimed(&env, &user)
            .checked_add(pending)
            .ok_or(ContractError::MathOverflow)
    }

    pub fn get_user_unclaimed_rewards(env: Env, user: Address) -> i128 {
        Self::unclaimed(&env, &user)
    }

    pub fn get_user_asset_index(env: Env, user: Address, asset: Address) -> i128 {
        distribution::user_index(&env, &asset, &user)
    }

    pub fn get_asset_state(env: Env, asset: Address) -> AssetDistribution {
        distribution::asset_state(&env, &asset)
    }

    pub fn get_distribution_end(env: Env, asset: Address) -> u64 {
        distribution::distribution_end(&env, &asset)
    }

    pub fn get_claimer(env: Env, user: Address) -> Option<Address> {
        env.storage().persistent().get(&(CLAIMER, user))
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn load_config(env: &Env) -> Result<IncentivesConfig, ContractError> {
        env.storage()
            .instance()
            .get(&CONFIG)
            .ok_or(ContractError::NotInitialized)
    }

    fn require_emission_manager(env: &Env, caller: &Address) -> Result<(), ContractError> {
        let config = Self::load_config(env)?;
        if *caller != config.emission_manager {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn unclaimed(env: &Env, user: &Address) -> i128 {
        env.storage()
            .persistent()
            .get(&(UNCLAIMED, user.clone()))
            .unwrap_or(0)
    }

    fn set_unclaimed(env: &Env, user: &Address, amount: i128) {
        let key = (UNCLAIMED, user.clone());
        env.storage().persistent().set(&key, &amount);
        env.storage()
            .persistent()
            .extend_ttl(&key, common::TTL_THRESHOLD, common::TTL_EXTEND_TO);
    }

    fn add_unclaimed(env: &Env, user: &Address, amount: i128) -> Result<(), ContractError> {
        let total = Self::unclaimed(env, user)
            .checked_add(amount)
            .ok_or(ContractError::MathOverflow)?;
        Self::set_unclaimed(env, user, total);
        Ok(())
    }

    fn claim(
        env: &Env,
        assets: &Vec<Address>,
        amount: i128,
        user: &Address,
        to: &Address,
        claimer: &Address,
    ) -> Result<i128, ContractError> {
        let config = Self::load_config(env)?;
        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }

        // 1. Settle every listed asset.
        let now = env.ledger().timestamp();
        let mut accrued: i128 = 0;
        for asset in assets.iter() {
            let (staked_by_user, total_staked) =
                ScaledBalanceSourceClient::new(env, &asset).scaled_balance_and_supply(user);
            let delta = distribution::update_user_accrual(
                env,
                &asset,
                user,
                staked_by_user,
                total_staked,
                now,
            )?;
            accrued = accrued
                .checked_add(delta)
                .ok_or(ContractError::MathOverflow)?;
        }
        if accrued != 0 {
            Self::add_unclaimed(env, user, accrued)?;
            events::publish_rewards_accrued(env, user.clone(), accrued);
        }

        // 2. Clamp and debit.
        let unclaimed = Self::unclaimed(env, user);
        if unclaimed == 0 {
            return Ok(0);
        }
        let to_claim = amount.min(unclaimed);
        Self::set_unclaimed(env, user, unclaimed - to_claim);
        events::publish_rewards_claimed(env, user.clone(), to.clone(), claimer.clone(), to_claim);

        // 3. Pull from the vault and stake for `to`.
        let contract = env.current_contract_address();
        token::Client::new(env, &config.governance_token).transfer_from(
            &contract,
            &config.rewards_vault,
            &contract,
            &to_claim,
        );
        env.authorize_as_current_contract(vec![
            env,
            InvokerContractAuthEntry::Contract(SubContractInvocation {
                context: ContractContext {
                    contract: config.governance_token.clone(),
                    fn_name: Symbol::new(env, "transfer"),
                    args: (contract.clone(), config.staked_token.clone(), to_claim).into_val(env),
                },
                sub_invocations: vec![env],
            }),
        ]);
        StakedTokenClient::new(env, &config.staked_token).stake(&contract, to, &to_claim);

        Ok(to_claim)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
