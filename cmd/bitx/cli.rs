use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{ArgAction, Parser as ClapParser, Subcommand as ClapSubcommand};
use eyre::{WrapErr, bail, eyre};
use num_bigint::BigUint;
use tracing::{Level, info};

use bitx_client::TxFetcher;
use bitx_common::{Tx, TxIn, TxOut};
use bitx_crypto::{base58, ecdsa::PrivateKey, hash::hash256, secp256k1::N};
use bitx_script::Script;

pub const VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

#[allow(clippy::upper_case_acronyms)]
#[derive(ClapParser)]
#[command(name = "bitx", version = VERSION_STRING, about = "bitx Bitcoin toolkit")]
pub struct CLI {
    #[command(flatten)]
    pub opts: Options,
    #[command(subcommand)]
    pub command: Subcommand,
}

#[derive(ClapParser)]
pub struct Options {
    #[arg(
        long = "log.level",
        default_value_t = Level::WARN,
        value_name = "LOG_LEVEL",
        help = "The verbosity level used for logs.",
        long_help = "Possible values: info, debug, trace, warn, error",
        help_heading = "Logging options"
    )]
    pub log_level: Level,
    #[arg(
        long = "cache",
        value_name = "CACHE_FILE",
        help = "JSON transaction cache to load before fetching and update afterwards.",
        help_heading = "Fetcher options"
    )]
    pub cache: Option<PathBuf>,
}

#[derive(ClapSubcommand)]
pub enum Subcommand {
    #[command(about = "Print the compressed testnet address for a secret read from stdin")]
    Address,
    #[command(about = "Fetch a transaction by txid and pretty-print it")]
    Fetch {
        #[arg(
            long = "testnet",
            action = ArgAction::SetTrue,
            help = "Fetch from the testnet chain instead of mainnet."
        )]
        testnet: bool,
        #[arg(
            long = "fresh",
            action = ArgAction::SetTrue,
            help = "Bypass the cache and refetch."
        )]
        fresh: bool,
        #[arg(value_name = "TXID")]
        txid: String,
    },
    #[command(
        about = "Build a testnet transaction, sign input 0 with a secret read from stdin, and print the hex"
    )]
    Send {
        #[arg(
            long = "in",
            value_name = "PREV_TXID:INDEX",
            required = true,
            help = "Outpoint to spend; repeatable."
        )]
        inputs: Vec<String>,
        #[arg(
            long = "out",
            value_name = "AMOUNT:ADDRESS",
            required = true,
            help = "Satoshi amount and Base58Check address to pay; repeatable."
        )]
        outputs: Vec<String>,
        #[arg(long = "locktime", default_value_t = 0)]
        locktime: u32,
    },
}

pub fn run(cli: CLI) -> eyre::Result<()> {
    match cli.command {
        Subcommand::Address => address(),
        Subcommand::Fetch {
            testnet,
            fresh,
            txid,
        } => fetch(&cli.opts, testnet, fresh, &txid),
        Subcommand::Send {
            inputs,
            outputs,
            locktime,
        } => send(&cli.opts, &inputs, &outputs, locktime),
    }
}

/// Reads a secret passphrase from stdin and stretches it onto the curve.
fn read_key() -> eyre::Result<PrivateKey> {
    eprint!("secret passphrase: ");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .wrap_err("reading secret from stdin")?;
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        bail!("empty secret");
    }
    let secret = BigUint::from_bytes_be(&hash256(line.as_bytes())) % &*N;
    PrivateKey::new(secret).map_err(|err| eyre!(err))
}

fn open_fetcher(opts: &Options) -> eyre::Result<TxFetcher> {
    let mut fetcher = TxFetcher::new();
    if let Some(path) = &opts.cache
        && path.exists()
    {
        fetcher.load_cache(path).map_err(|err| eyre!(err))?;
    }
    Ok(fetcher)
}

fn save_cache(opts: &Options, fetcher: &TxFetcher) -> eyre::Result<()> {
    if let Some(path) = &opts.cache {
        fetcher.dump_cache(path).map_err(|err| eyre!(err))?;
        info!(path = %path.display(), "cache updated");
    }
    Ok(())
}

fn address() -> eyre::Result<()> {
    let key = read_key()?;
    println!("{}", key.point().address(true, true));
    Ok(())
}

fn fetch(opts: &Options, testnet: bool, fresh: bool, txid: &str) -> eyre::Result<()> {
    let mut fetcher = open_fetcher(opts)?;
    let tx = TxFetcher::fetch(&mut fetcher, txid, testnet, fresh).map_err(|err| eyre!(err))?;
    println!("{tx}");
    save_cache(opts, &fetcher)
}

fn send(opts: &Options, inputs: &[String], outputs: &[String], locktime: u32) -> eyre::Result<()> {
    let tx_ins = inputs
        .iter()
        .map(|spec| parse_input(spec))
        .collect::<eyre::Result<Vec<_>>>()?;
    let tx_outs = outputs
        .iter()
        .map(|spec| parse_output(spec))
        .collect::<eyre::Result<Vec<_>>>()?;

    let mut tx = Tx::new(1, tx_ins, tx_outs, locktime, true);
    let key = read_key()?;
    let mut fetcher = open_fetcher(opts)?;

    if !tx.sign_input(&mut fetcher, 0, &key)? {
        bail!("signed input does not verify; is the secret right for the output being spent?");
    }
    println!("{}", hex::encode(tx.serialize()));
    save_cache(opts, &fetcher)
}

/// `PREV_TXID:INDEX`, txid in display order.
fn parse_input(spec: &str) -> eyre::Result<TxIn> {
    let (txid, index) = spec
        .split_once(':')
        .ok_or_else(|| eyre!("--in expects PREV_TXID:INDEX, got {spec:?}"))?;
    let raw = hex::decode(txid).wrap_err("previous txid is not hex")?;
    let prev_tx: [u8; 32] = raw
        .try_into()
        .map_err(|_| eyre!("previous txid must be 32 bytes"))?;
    let prev_index = index.parse().wrap_err("output index is not a number")?;
    Ok(TxIn::new(prev_tx, prev_index))
}

/// `AMOUNT:ADDRESS`, amount in satoshi.
fn parse_output(spec: &str) -> eyre::Result<TxOut> {
    let (amount, addr) = spec
        .split_once(':')
        .ok_or_else(|| eyre!("--out expects AMOUNT:ADDRESS, got {spec:?}"))?;
    let amount = amount.parse().wrap_err("amount is not a satoshi count")?;

    let payload = base58::decode_check(addr).map_err(|err| eyre!(err))?;
    let script = match payload.split_first() {
        // P2PKH version bytes, mainnet and testnet.
        Some((&(0x00 | 0x6f), h160)) if h160.len() == 20 => {
            Script::p2pkh(h160.try_into().expect("20 bytes"))
        }
        // P2SH version bytes.
        Some((&(0x05 | 0xc4), h160)) if h160.len() == 20 => {
            Script::p2sh(h160.try_into().expect("20 bytes"))
        }
        _ => bail!("unsupported address version in {addr:?}"),
    };
    Ok(TxOut::new(amount, script))
}
