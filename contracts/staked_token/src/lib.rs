#![no_std]

pub mod events;
pub mod heatup;
pub mod hook;
pub mod position;
pub mod voting;

use common::{distribution, math, nonce, AssetDistribution, CommonError, UserAssetStake, MAX_BPS};
use soroban_sdk::{
    contract, contractimpl, contracttype, log, symbol_short, token, vec, Address, BytesN, Env,
    Symbol, Vec,
};

use heatup::HeatupState;
use voting::PowerType;

// ── Storage key constants ────────────────────────────────────────────────────

const CONFIG: Symbol = symbol_short!("CONFIG");
const STAKE_RATIO: Symbol = symbol_short!("STK_RATIO");

/// `claim_rewards` amount meaning "everything currently claimable".
pub const CLAIM_ALL: i128 = i128::MAX;

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
    InsufficientBalance = 6,
    InsufficientAllowance = 7,
    InsufficientHeatup = 8,
    WindowFinished = 9,
    InvalidAmount = 10,
    InvalidSignature = 11,
    InvalidNonce = 12,
    Expired = 13,
    MathOverflow = 14,
}

impl From<CommonError> for ContractError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::NotInitialized => ContractError::NotInitialized,
            CommonError::AlreadyInitialized => ContractError::AlreadyInitialized,
            CommonError::AccessDenied => ContractError::Unauthorized,
            CommonError::InvalidInput => ContractError::InvalidInput,
            CommonError::InvalidNonce | CommonError::NonceOverflow => ContractError::InvalidNonce,
            CommonError::InvalidConfig => ContractError::InvalidConfig,
            CommonError::MathOverflow => ContractError::MathOverflow,
        }
    }
}

// ── Public-facing types ──────────────────────────────────────────────────────

/// Immutable parameters fixed at initialisation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedTokenConfig {
    /// Sole identity allowed to change distribution settings.
    pub emission_manager: Address,
    /// Token that is staked, redeemed and paid out as rewards.
    pub governance_token: Address,
    /// Holder of reward funds; must approve this contract.
    pub rewards_vault: Address,
    pub heatup_seconds: u64,
    pub unstake_window: u64,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakedTokenContract;

#[contractimpl]
impl StakedTokenContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the contract.
    ///
    /// * `heatup_seconds` – wait between `heatup` and the unstake window.
    /// * `unstake_window` – seconds during which `redeem` is allowed.
    pub fn initialize(
        env: Env,
        emission_manager: Address,
        governance_token: Address,
        rewards_vault: Address,
        heatup_seconds: u64,
        unstake_window: u64,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&CONFIG) {
            return Err(ContractError::AlreadyInitialized);
        }
        if unstake_window == 0 {
            return Err(ContractError::InvalidInput);
        }

        let config = StakedTokenConfig {
            emission_manager: emission_manager.clone(),
            governance_token: governance_token.clone(),
            rewards_vault: rewards_vault.clone(),
            heatup_seconds,
            unstake_window,
        };
        env.storage().instance().set(&CONFIG, &config);

        events::publish_initialized(
            &env,
            emission_manager,
            governance_token,
            rewards_vault,
            heatup_seconds,
            unstake_window,
        );

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Stake `amount` governance tokens from `staker`, crediting
    /// `on_behalf_of`.
    ///
    /// Rewards of `on_behalf_of` are settled on the pre-stake balance, and an
    /// active heatup is pushed later in proportion to the new stake.
    pub fn stake(
        env: Env,
        staker: Address,
        on_behalf_of: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        staker.require_auth();
        Self::stake_from(&env, &staker, &on_behalf_of, amount, false)
    }

    /// Stake for oneself and (re)start the heatup in the same action.
    pub fn stake_and_activate_heatup(
        env: Env,
        staker: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        staker.require_auth();
        Self::stake_from(&env, &staker, &staker, amount, true)
    }

    /// Start the heatup. Restarts it when one is already running.
    pub fn heatup(env: Env, staker: Address) -> Result<(), ContractError> {
        Self::load_config(&env)?;
        staker.require_auth();

        if position::balance(&env, &staker) == 0 {
            return Err(ContractError::InsufficientBalance);
        }

        let now = env.ledger().timestamp();
        heatup::store(&env, &staker, now);
        log!(&env, "heatup activated", staker, now);
        events::publish_heatup_activated(&env, staker, now);

        Ok(())
    }

    /// Burn up to `amount` of `staker`'s position and send the underlying
    /// governance tokens to `to`. Only allowed inside the unstake window.
    pub fn redeem(
        env: Env,
        staker: Address,
        to: Address,
        amount: i128,
    ) -> Result<i128, ContractError> {
        let config = Self::load_config(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }

        let now = env.ledger().timestamp();
        let started = heatup::load(&env, &staker);
        heatup::require_redeemable(started, now, config.heatup_seconds, config.unstake_window)?;

        let balance = position::balance(&env, &staker);
        let redeemed = amount.min(balance);

        // 1. Settle on the pre-burn balance.
        Self::accrue(&env, &staker, balance, position::total_supply(&env), now)?;

        // 2. Burn; an emptied position goes back to idle.
        position::move_balance(&env, Some(&staker), None, redeemed)?;
        if balance - redeemed == 0 {
            heatup::store(&env, &staker, 0);
        }

        events::publish_redeemed(&env, staker.clone(), to.clone(), redeemed);

        // 3. External calls last.
        if redeemed > 0 {
            token::Client::new(&env, &config.governance_token).transfer(
                &env.current_contract_address(),
                &to,
                &redeemed,
            );
            hook::notify(&env, Some(staker), None, redeemed);
        }

        Ok(redeemed)
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Claim `amount` of `staker`'s rewards (`CLAIM_ALL` for everything).
    ///
    /// The `stake_ratio` share of the claim is staked again on behalf of
    /// `to`; the rest is paid to `to` in governance tokens. Both come from
    /// the rewards vault.
    pub fn claim_rewards(
        env: Env,
        staker: Address,
        to: Address,
        amount: i128,
    ) -> Result<i128, ContractError> {
        let config = Self::load_config(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }

        let now = env.ledger().timestamp();
        let balance = position::balance(&env, &staker);
        Self::accrue(&env, &staker, balance, position::total_supply(&env), now)?;

        let unclaimed = position::unclaimed(&env, &staker);
        let to_claim = if amount == CLAIM_ALL { unclaimed } else { amount };
        if to_claim > unclaimed {
            return Err(ContractError::InvalidAmount);
        }
        position::set_unclaimed(&env, &staker, unclaimed - to_claim);
        if to_claim == 0 {
            return Ok(0);
        }

        let restaked = math::mul_div(
            &env,
            to_claim,
            i128::from(Self::get_stake_ratio(env.clone())),
            i128::from(MAX_BPS),
        )?;
        let paid = to_claim - restaked;
        let contract = env.current_contract_address();

        if restaked > 0 {
            Self::mint_stake(&env, &config, &contract, &to, restaked, now)?;
        }
        events::publish_rewards_claimed(&env, staker, to.clone(), to_claim, restaked);

        let governance = token::Client::new(&env, &config.governance_token);
        if restaked > 0 {
            governance.transfer_from(&contract, &config.rewards_vault, &contract, &restaked);
            hook::notify(&env, None, Some(to.clone()), restaked);
        }
        if paid > 0 {
            governance.transfer_from(&contract, &config.rewards_vault, &to, &paid);
        }

        Ok(to_claim)
    }

    // ── Token surface ───────────────────────────────────────────────────────

    pub fn transfer(
        env: Env,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        from.require_auth();
        Self::transfer_position(&env, &from, &to, amount)
    }

    pub fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        spender.require_auth();
        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }
        position::spend_allowance(&env, &from, &spender, amount)?;
        Self::transfer_position(&env, &from, &to, amount)
    }

    pub fn approve(
        env: Env,
        owner: Address,
        spender: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        owner.require_auth();
        if amount < 0 {
            return Err(ContractError::InvalidInput);
        }
        position::set_allowance(&env, &owner, &spender, amount);
        events::publish_approval(&env, owner, spender, amount);
        Ok(())
    }

    pub fn allowance(env: Env, owner: Address, spender: Address) -> i128 {
        position::allowance(&env, &owner, &spender)
    }

    pub fn balance(env: Env, user: Address) -> i128 {
        position::balance(&env, &user)
    }

    pub fn total_supply(env: Env) -> i128 {
        position::total_supply(&env)
    }

    // ── Delegation ──────────────────────────────────────────────────────────

    /// Delegate both voting and proposition power to `delegatee`.
    pub fn delegate(env: Env, delegator: Address, delegatee: Address) -> Result<(), ContractError> {
        delegator.require_auth();
        Self::delegate_tracks(&env, &delegator, &delegatee, None)
    }

    pub fn delegate_by_type(
        env: Env,
        delegator: Address,
        delegatee: Address,
        power_type: PowerType,
    ) -> Result<(), ContractError> {
        delegator.require_auth();
        Self::delegate_tracks(&env, &delegator, &delegatee, Some(power_type))
    }

    /// Bind an ed25519 key to `owner` for signed delegations. `signature`
    /// must sign `voting::key_registration_message` for this contract.
    pub fn register_signing_key(
        env: Env,
        owner: Address,
        public_key: BytesN<32>,
        signature: BytesN<64>,
    ) -> Result<(), ContractError> {
        owner.require_auth();
        voting::register_signing_key(&env, &owner, &public_key, &signature);
        events::publish_signing_key_registered(&env, owner, public_key);
        Ok(())
    }

    /// Relay a signed delegation of both power tracks.
    pub fn delegate_by_sig(
        env: Env,
        public_key: BytesN<32>,
        delegatee: Address,
        nonce: u64,
        expiry: u64,
        signature: BytesN<64>,
    ) -> Result<(), ContractError> {
        Self::delegate_signed(&env, &public_key, &delegatee, None, nonce, expiry, &signature)
    }

    /// Relay a signed delegation of a single power track.
    pub fn delegate_by_type_by_sig(
        env: Env,
        public_key: BytesN<32>,
        delegatee: Address,
        power_type: PowerType,
        nonce: u64,
        expiry: u64,
        signature: BytesN<64>,
    ) -> Result<(), ContractError> {
        Self::delegate_signed(
            &env,
            &public_key,
            &delegatee,
            Some(power_type),
            nonce,
            expiry,
            &signature,
        )
    }

    pub fn get_delegatee_by_type(env: Env, delegator: Address, power_type: PowerType) -> Address {
        voting::delegatee(&env, &delegator, power_type)
    }

    pub fn get_power_current(env: Env, user: Address, power_type: PowerType) -> i128 {
        voting::power_current(&env, &user, power_type)
    }

    /// Power of `user` as of ledger `ledger`. Future ledgers are rejected.
    pub fn get_power_at(
        env: Env,
        user: Address,
        power_type: PowerType,
        ledger: u32,
    ) -> Result<i128, ContractError> {
        if ledger > env.ledger().sequence() {
            return Err(ContractError::InvalidInput);
        }
        Ok(voting::power_at(&env, &user, power_type, ledger))
    }

    pub fn get_snapshot_count(env: Env, user: Address, power_type: PowerType) -> u32 {
        voting::snapshot_count(&env, &user, power_type)
    }

    pub fn get_nonce(env: Env, signer: Address) -> u64 {
        nonce::current_nonce(&env, &signer)
    }

    // ── View functions ───────────────────────────────────────────────────────

    pub fn get_config(env: Env) -> Result<StakedTokenConfig, ContractError> {
        Self::load_config(&env)
    }

    pub fn get_heatup(env: Env, user: Address) -> u64 {
        heatup::load(&env, &user)
    }

    pub fn get_heatup_state(env: Env, user: Address) -> Result<HeatupState, ContractError> {
        let config = Self::load_config(&env)?;
        Ok(heatup::state_at(
            heatup::load(&env, &user),
            env.ledger().timestamp(),
            config.heatup_seconds,
            config.unstake_window,
        ))
    }

    /// Heatup `to` would end up with after receiving `amount` from a sender
    /// whose heatup is `from_heatup`.
    pub fn get_next_heatup_timestamp(
        env: Env,
        from_heatup: u64,
        amount: i128,
        to: Address,
    ) -> Result<u64, ContractError> {
        let config = Self::load_config(&env)?;
        Ok(heatup::next_heatup(
            from_heatup,
            amount,
            heatup::load(&env, &to),
            position::balance(&env, &to),
            env.ledger().timestamp(),
            config.heatup_seconds,
            config.unstake_window,
        ))
    }

    /// Rewards settled for `user` but not yet claimed.
    pub fn get_unclaimed_rewards(env: Env, user: Address) -> i128 {
        position::unclaimed(&env, &user)
    }

    /// Settled rewards plus everything accrued since the last settlement.
    pub fn get_total_rewards_balance(env: Env, user: Address) -> Result<i128, ContractError> {
        let stakes = vec![
            &env,
            UserAssetStake {
                asset: env.current_contract_address(),
                staked_by_user: position::balance(&env, &user),
                total_staked: position::total_supply(&env),
            },
        ];
        let pending =
            distribution::preview_unclaimed(&env, &user, &stakes, env.ledger().timestamp())?;
        position::unclaimed(&env, &user)
            .checked_add(pending)
            .ok_or(ContractError::MathOverflow)
    }

    pub fn get_asset_state(env: Env) -> AssetDistribution {
        distribution::asset_state(&env, &env.current_contract_address())
    }

    pub fn get_user_index(env: Env, user: Address) -> i128 {
        distribution::user_index(&env, &env.current_contract_address(), &user)
    }

    pub fn get_distribution_end(env: Env) -> u64 {
        distribution::distribution_end(&env, &env.current_contract_address())
    }

    pub fn get_stake_ratio(env: Env) -> u32 {
        env.storage().instance().get(&STAKE_RATIO).unwrap_or(0)
    }

    pub fn get_transfer_hook(env: Env) -> Option<Address> {
        hook::get(&env)
    }

    // ── Admin functions ──────────────────────────────────────────────────────

    /// Replace the emission schedule (per-second rate per month) and share
    /// ratio of this token's own distribution.
    ///
    /// The index is settled under the old schedule first, so existing
    /// stakers never gain or lose rewards retroactively.
    pub fn configure_distribution(
        env: Env,
        caller: Address,
        emission_schedule: Vec<i128>,
        share_ratio: u32,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        Self::require_emission_manager(&env, &caller)?;

        distribution::configure_asset(
            &env,
            &env.current_contract_address(),
            emission_schedule,
            share_ratio,
            position::total_supply(&env),
            env.ledger().timestamp(),
        )?;
        Ok(())
    }

    pub fn set_distribution_start(
        env: Env,
        caller: Address,
        distribution_start: u64,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        Self::require_emission_manager(&env, &caller)?;

        distribution::set_distribution_start(
            &env,
            &env.current_contract_address(),
            distribution_start,
            position::total_supply(&env),
            env.ledger().timestamp(),
        )?;
        Ok(())
    }

    /// Set the share of every claim that is staked again (bps).
    pub fn set_stake_ratio(env: Env, caller: Address, stake_ratio: u32) -> Result<(), ContractError> {
        caller.require_auth();
        Self::require_emission_manager(&env, &caller)?;

        if stake_ratio > MAX_BPS {
            return Err(ContractError::InvalidConfig);
        }
        env.storage().instance().set(&STAKE_RATIO, &stake_ratio);
        events::publish_stake_ratio_set(&env, stake_ratio);
        Ok(())
    }

    /// Set (or clear) the governance contract notified on balance moves.
    pub fn set_transfer_hook(
        env: Env,
        caller: Address,
        transfer_hook: Option<Address>,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        Self::require_emission_manager(&env, &caller)?;

        hook::set(&env, &transfer_hook);
        events::publish_transfer_hook_set(&env, transfer_hook);
        Ok(())
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn load_config(env: &Env) -> Result<StakedTokenConfig, ContractError> {
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

    /// Settle `user`'s rewards for `balance` held until `now` into their
    /// unclaimed balance.
    fn accrue(
        env: &Env,
        user: &Address,
        balance: i128,
        total_supply: i128,
        now: u64,
    ) -> Result<i128, ContractError> {
        let accrued = distribution::update_user_accrual(
            env,
            &env.current_contract_address(),
            user,
            balance,
            total_supply,
            now,
        )?;
        if accrued != 0 {
            position::add_unclaimed(env, user, accrued)?;
            events::publish_rewards_accrued(env, user.clone(), accrued);
        }
        Ok(accrued)
    }

    /// Internal half of staking: settle, merge the heatup, mint.
    fn mint_stake(
        env: &Env,
        config: &StakedTokenConfig,
        staker: &Address,
        on_behalf_of: &Address,
        amount: i128,
        now: u64,
    ) -> Result<(), ContractError> {
        let balance = position::balance(env, on_behalf_of);
        let total_supply = position::total_supply(env);
        Self::accrue(env, on_behalf_of, balance, total_supply, now)?;

        let current = heatup::load(env, on_behalf_of);
        let next = heatup::next_heatup(
            0,
            amount,
            current,
            balance,
            now,
            config.heatup_seconds,
            config.unstake_window,
        );
        if next != current {
            heatup::store(env, on_behalf_of, next);
        }

        position::move_balance(env, None, Some(on_behalf_of), amount)?;
        events::publish_staked(
            env,
            staker.clone(),
            on_behalf_of.clone(),
            amount,
            position::total_supply(env),
        );
        Ok(())
    }

    fn stake_from(
        env: &Env,
        staker: &Address,
        on_behalf_of: &Address,
        amount: i128,
        activate_heatup: bool,
    ) -> Result<(), ContractError> {
        let config = Self::load_config(env)?;
        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }

        let now = env.ledger().timestamp();
        Self::mint_stake(env, &config, staker, on_behalf_of, amount, now)?;
        if activate_heatup {
            heatup::store(env, on_behalf_of, now);
            events::publish_heatup_activated(env, on_behalf_of.clone(), now);
        }

        token::Client::new(env, &config.governance_token).transfer(
            staker,
            &env.current_contract_address(),
            &amount,
        );
        hook::notify(env, None, Some(on_behalf_of.clone()), amount);
        Ok(())
    }

    /// Move `amount` of stake from `from` to `to`, settling both sides and
    /// carrying the heatup rules along.
    fn transfer_position(
        env: &Env,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        let config = Self::load_config(env)?;
        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }

        let now = env.ledger().timestamp();
        let from_balance = position::balance(env, from);
        if from_balance < amount {
            return Err(ContractError::InsufficientBalance);
        }
        let total_supply = position::total_supply(env);

        Self::accrue(env, from, from_balance, total_supply, now)?;
        if from != to {
            let to_balance = position::balance(env, to);
            Self::accrue(env, to, to_balance, total_supply, now)?;

            let from_heatup = heatup::load(env, from);
            let to_heatup = heatup::load(env, to);
            let next = heatup::next_heatup(
                from_heatup,
                amount,
                to_heatup,
                to_balance,
                now,
                config.heatup_seconds,
                config.unstake_window,
            );
            if next != to_heatup {
                heatup::store(env, to, next);
            }
            // Nothing left to cool down.
            if from_balance == amount && from_heatup != 0 {
                heatup::store(env, from, 0);
            }
        }

        position::move_balance(env, Some(from), Some(to), amount)?;
        events::publish_transfer(env, from.clone(), to.clone(), amount);

        hook::notify(env, Some(from.clone()), Some(to.clone()), amount);
        Ok(())
    }

    fn delegate_tracks(
        env: &Env,
        delegator: &Address,
        delegatee: &Address,
        power_type: Option<PowerType>,
    ) -> Result<(), ContractError> {
        let balance = position::balance(env, delegator);
        match power_type {
            Some(power_type) => voting::delegate(env, delegator, delegatee, power_type, balance),
            None => {
                for power_type in PowerType::ALL {
                    voting::delegate(env, delegator, delegatee, power_type, balance)?;
                }
                Ok(())
            }
        }
    }

    fn delegate_signed(
        env: &Env,
        public_key: &BytesN<32>,
        delegatee: &Address,
        power_type: Option<PowerType>,
        nonce: u64,
        expiry: u64,
        signature: &BytesN<64>,
    ) -> Result<(), ContractError> {
        let message = voting::delegation_message(
            env,
            &env.current_contract_address(),
            delegatee,
            power_type,
            nonce,
            expiry,
        );
        let signer = voting::recover_signer(env, public_key, &message, signature)?;
        nonce::validate_and_increment_nonce(env, &signer, nonce)?;
        if env.ledger().timestamp() > expiry {
            return Err(ContractError::Expired);
        }
        Self::delegate_tracks(env, &signer, delegatee, power_type)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod test_heatup;

#[cfg(test)]
mod test_voting;
