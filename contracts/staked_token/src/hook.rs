use soroban_sdk::{contractclient, symbol_short, Address, Env, Symbol};

const TRANSFER_HOOK: Symbol = symbol_short!("HOOK");

/// Governance contract notified of every staked-token balance move.
#[contractclient(name = "TransferHookClient")]
pub trait TransferHook {
    fn on_transfer(env: Env, from: Option<Address>, to: Option<Address>, amount: i128);
}

pub fn get(env: &Env) -> Option<Address> {
    env.storage().instance().get(&TRANSFER_HOOK)
}

pub fn set(env: &Env, hook: &Option<Address>) {
    match hook {
        Some(hook) => env.storage().instance().set(&TRANSFER_HOOK, hook),
        None => env.storage().instance().remove(&TRANSFER_HOOK),
    }
}

/// Call the configured hook. Must run after all internal state is written.
pub fn notify(env: &Env, from: Option<Address>, to: Option<Address>, amount: i128) {
    if let Some(hook) = get(env) {
        TransferHookClient::new(env, &hook).on_transfer(&from, &to, &amount);
    }
}
