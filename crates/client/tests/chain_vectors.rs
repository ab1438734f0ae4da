//! Vectors that need the real chain: run with
//! `cargo test -p bitx-client -- --ignored` and network access.

use num_bigint::BigUint;
use num_traits::Num;

use bitx_client::TxFetcher;
use bitx_common::TxSource;

#[test]
#[ignore = "fetches from blockstream.info"]
fn sig_hash_vector() {
    let mut fetcher = TxFetcher::new();
    let tx = fetcher
        .fetch(
            "452c629d67e41baec3ac6f04fe744b4b9617f8f859c63b3002f8684e7a4fee03",
            false,
            false,
        )
        .unwrap();
    let z = tx.sig_hash(&mut fetcher, 0, None).unwrap();
    assert_eq!(
        z,
        BigUint::from_str_radix(
            "27e0c5994dec7824e56dec6b2fcb342eb7cdb0d0957c2fce9882f715e85d81a6",
            16
        )
        .unwrap()
    );
}

#[test]
#[ignore = "fetches from blockstream.info"]
fn verify_p2pkh_testnet_transaction() {
    let mut fetcher = TxFetcher::new();
    let tx = fetcher
        .fetch(
            "5418099cc755cb9dd3ebc6cf1a7888ad53a1a3beb5a025bce89eb1bf7f1650a2",
            true,
            false,
        )
        .unwrap();
    assert!(tx.verify(&mut fetcher).unwrap());
}

#[test]
#[ignore = "fetches from blockstream.info"]
fn verify_p2sh_two_of_three_transaction() {
    let mut fetcher = TxFetcher::new();
    let tx = fetcher
        .fetch(
            "46df1a9484d0a81d03ce0ee543ab6e1a23ed06175c104a178268fad381216c2b",
            false,
            false,
        )
        .unwrap();
    assert!(tx.verify(&mut fetcher).unwrap());
}
