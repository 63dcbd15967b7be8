// Entry point for the kok-chain CLI. Every command works against the state database
// in the configured data directory.
use kok_chain::core::{
    classify, intrinsic_gas, recorded_coinbase, AddressRole, BlockContext, BlockProcessor,
    TransferBackend, WorldState,
};
use kok_chain::{ChainConfig, Command, Genesis, Opt, StateStore, Transaction, GLOBAL_CONFIG};
use clap::Parser;
use log::{error, info, LevelFilter};
use std::fs;
use std::process;

fn main() {
    env_logger::builder().filter_level(LevelFilter::Info).init();

    let opt = Opt::parse();
    if let Some(data_dir) = opt.data_dir {
        GLOBAL_CONFIG.set_data_dir(data_dir);
    }

    if let Err(e) = run_command(opt.command) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn open_store() -> Result<StateStore, Box<dyn std::error::Error>> {
    let data_dir = GLOBAL_CONFIG.get_data_dir();
    Ok(StateStore::open(data_dir)?)
}

// Stored chain parameters with any environment overrides applied
fn chain_config(store: &StateStore) -> Result<ChainConfig, Box<dyn std::error::Error>> {
    let stored = store.chain_config()?.unwrap_or_default();
    Ok(GLOBAL_CONFIG.apply_overrides(stored)?)
}

fn run_command(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Init { genesis } => {
            let genesis = Genesis::from_toml_file(&genesis)?;
            let store = open_store()?;
            if store.head_number()?.is_some() {
                return Err(format!(
                    "State database at {} is already initialised",
                    store.get_db_path().display()
                )
                .into());
            }
            let state = genesis.to_state();
            store.commit_state(&state)?;
            store.set_chain_config(&genesis.config)?;
            store.set_head_number(0)?;
            println!(
                "Initialised {} accounts, total supply {}",
                state.len(),
                state.total_balance()
            );
        }
        Command::Balance { address } => {
            let state = open_store()?.load_state()?;
            println!(
                "Balance of {address}: {} (nonce {})",
                state.balance(&address),
                state.nonce(&address)
            );
        }
        Command::Classify { address } => {
            let state = open_store()?.load_state()?;
            let role = classify(&state, &address);
            match role {
                AddressRole::Normal => println!("{address}: {role}"),
                AddressRole::Contract | AddressRole::Template => println!(
                    "{address}: {role}, beneficiary {}",
                    recorded_coinbase(&state, &address)
                ),
            }
        }
        Command::IntrinsicGas {
            data,
            create,
            block,
        } => {
            let store = open_store()?;
            let config = chain_config(&store)?;
            let number = match block {
                Some(number) => number,
                None => store.head_number()?.map_or(0, |head| head + 1),
            };
            let gas = intrinsic_gas(&data.0, create, config.is_homestead(number))?;
            println!("Intrinsic gas at block {number}: {gas}");
        }
        Command::ApplyBlock {
            txs,
            coinbase,
            validators,
        } => {
            let text = fs::read_to_string(&txs)?;
            let transactions: Vec<Transaction> = serde_json::from_str(&text)?;

            let store = open_store()?;
            let head = store
                .head_number()?
                .ok_or("State database is not initialised, run `init` first")?;
            let coinbase = match coinbase {
                Some(coinbase) => coinbase,
                None => GLOBAL_CONFIG
                    .get_coinbase()?
                    .ok_or("No coinbase: pass --coinbase or set KOK_COINBASE")?,
            };

            let number = head + 1;
            let block = BlockContext::new(number, coinbase, chain_config(&store)?)
                .with_validators(validators);
            let mut state = store.load_state()?;
            let mut backend = TransferBackend::new();

            info!(
                "Applying {} transactions as block {number}",
                transactions.len()
            );
            let outcome = BlockProcessor::new(block).process(
                &mut state,
                &mut backend,
                &transactions,
            )?;

            store.commit_state(&state)?;
            store.store_receipts(number, &outcome.receipts)?;
            store.set_head_number(number)?;

            for receipt in &outcome.receipts {
                let status = if receipt.failed { "failed" } else { "ok" };
                println!("{} {status} gas {}", receipt.tx_hash, receipt.gas_used);
            }
            for rejected in &outcome.rejected {
                println!("{} rejected: {}", rejected.tx_hash, rejected.error);
            }
            println!(
                "Block {number}: {} gas used, {} left",
                outcome.gas_used, outcome.gas_pool_left
            );
        }
        Command::Receipts { number } => {
            let store = open_store()?;
            match store.receipts(number)? {
                Some(receipts) => {
                    for receipt in receipts {
                        println!("{}", serde_json::to_string(&receipt)?);
                    }
                }
                None => println!("No receipts stored for block {number}"),
            }
        }
    }
    Ok(())
}
