use crate::core::Address;
use crate::utils::serialization::decode_hex;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

/// Hex payload argument, `0x`-prefixed or bare
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HexArg(pub Vec<u8>);

impl FromStr for HexArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex(s)
            .map(HexArg)
            .map_err(|e| format!("Invalid payload: {e}"))
    }
}

impl std::fmt::Display for HexArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", crate::utils::serialization::encode_hex(&self.0))
    }
}

#[derive(Debug, Parser)]
#[command(name = "kok-chain")]
pub struct Opt {
    #[arg(long, global = true, help = "State database directory (overrides KOK_DATA_DIR)")]
    pub data_dir: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "init", about = "Initialise the state database from a genesis file")]
    Init {
        #[arg(help = "Path to the genesis TOML file")]
        genesis: PathBuf,
    },
    #[command(name = "balance", about = "Print the balance and nonce of an account")]
    Balance {
        #[arg(help = "Account address (0x-prefixed hex)")]
        address: Address,
    },
    #[command(name = "classify", about = "Print the on-chain role of an address")]
    Classify {
        #[arg(help = "Account address (0x-prefixed hex)")]
        address: Address,
    },
    #[command(
        name = "intrinsic-gas",
        about = "Compute the intrinsic gas of a transaction payload"
    )]
    IntrinsicGas {
        #[arg(help = "Payload as hex")]
        data: HexArg,
        #[arg(long = "create", help = "Charge the contract creation base cost")]
        create: bool,
        #[arg(long = "block", help = "Block number (defaults to the next block)")]
        block: Option<u64>,
    },
    #[command(
        name = "apply-block",
        about = "Apply a JSON list of transactions as the next block"
    )]
    ApplyBlock {
        #[arg(help = "Path to the transactions JSON file")]
        txs: PathBuf,
        #[arg(long = "coinbase", help = "Block proposer (defaults to KOK_COINBASE)")]
        coinbase: Option<Address>,
        #[arg(
            long = "validators",
            value_delimiter = ',',
            help = "Comma-separated validator addresses"
        )]
        validators: Vec<Address>,
    },
    #[command(name = "receipts", about = "Print the receipts stored for a block")]
    Receipts {
        #[arg(help = "Block number")]
        number: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_apply_block() {
        let opt = Opt::try_parse_from([
            "kok-chain",
            "apply-block",
            "txs.json",
            "--coinbase",
            "0x1111111111111111111111111111111111111111",
            "--validators",
            "0x2222222222222222222222222222222222222222,0x3333333333333333333333333333333333333333",
        ])
        .unwrap();

        match opt.command {
            Command::ApplyBlock {
                txs,
                coinbase,
                validators,
            } => {
                assert_eq!(txs, PathBuf::from("txs.json"));
                assert_eq!(coinbase, Some(Address([0x11; 20])));
                assert_eq!(validators, vec![Address([0x22; 20]), Address([0x33; 20])]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_intrinsic_gas() {
        let opt =
            Opt::try_parse_from(["kok-chain", "intrinsic-gas", "0x00ff", "--create"]).unwrap();
        match opt.command {
            Command::IntrinsicGas {
                data,
                create,
                block,
            } => {
                assert_eq!(data, HexArg(vec![0x00, 0xff]));
                assert!(create);
                assert_eq!(block, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_data_dir_is_global() {
        let opt = Opt::try_parse_from(["kok-chain", "receipts", "3", "--data-dir", "/tmp/kok"])
            .unwrap();
        assert_eq!(opt.data_dir.as_deref(), Some("/tmp/kok"));
        assert!(matches!(opt.command, Command::Receipts { number: 3 }));

        let opt = Opt::try_parse_from(["kok-chain", "receipts", "3"]).unwrap();
        assert_eq!(opt.data_dir, None);
    }

    #[test]
    fn test_rejects_short_address() {
        assert!(Opt::try_parse_from(["kok-chain", "balance", "0x1234"]).is_err());
    }
}
