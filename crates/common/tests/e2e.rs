//! Cross-crate flows through the public API: building, signing, and
//! verifying transactions against an in-memory transaction source.

use std::collections::HashMap;

use num_bigint::BigUint;

use bitx_common::{BlockHeader, ChainError, Tx, TxIn, TxOut, TxSource};
use bitx_crypto::ecdsa::PrivateKey;
use bitx_crypto::hash::hash160;
use bitx_script::opcode;
use bitx_script::script::{Cmd, Script};

#[derive(Default)]
struct FakeChain {
    txs: HashMap<String, Tx>,
}

impl FakeChain {
    fn add(&mut self, tx: Tx) -> [u8; 32] {
        let hash = tx.hash();
        self.txs.insert(tx.id(), tx);
        hash
    }
}

impl TxSource for FakeChain {
    fn fetch(&mut self, txid: &str, _testnet: bool, _fresh: bool) -> Result<Tx, ChainError> {
        self.txs
            .get(txid)
            .cloned()
            .ok_or_else(|| ChainError::NotFound(txid.to_string()))
    }
}

fn key(secret: u32) -> PrivateKey {
    PrivateKey::new(BigUint::from(secret)).unwrap()
}

fn funding_tx(outputs: Vec<TxOut>) -> Tx {
    Tx::new(1, vec![TxIn::new([0xfe; 32], 0)], outputs, 0, true)
}

#[test]
fn multi_input_p2pkh_spend() {
    let alice = key(1001);
    let bob = key(2002);
    let mut chain = FakeChain::default();

    // Two separate outputs to Alice.
    let fund_a = funding_tx(vec![TxOut::new(
        70_000,
        Script::p2pkh(&alice.point().hash160(true)),
    )]);
    let fund_b = funding_tx(vec![
        TxOut::new(5_000, Script::p2pkh(&bob.point().hash160(true))),
        TxOut::new(40_000, Script::p2pkh(&alice.point().hash160(true))),
    ]);
    let hash_a = chain.add(fund_a);
    let hash_b = chain.add(fund_b);

    // Alice sweeps both into one output to Bob.
    let mut tx = Tx::new(
        1,
        vec![TxIn::new(hash_a, 0), TxIn::new(hash_b, 1)],
        vec![TxOut::new(
            100_000,
            Script::p2pkh(&bob.point().hash160(true)),
        )],
        0,
        true,
    );

    assert!(tx.sign_input(&mut chain, 0, &alice).unwrap());
    assert!(tx.sign_input(&mut chain, 1, &alice).unwrap());
    assert!(tx.verify(&mut chain).unwrap());
    assert_eq!(tx.fee(&mut chain).unwrap(), 10_000);

    // The serialized form round-trips and keeps its id.
    let raw = tx.serialize();
    let (parsed, rest) = Tx::parse(&raw, true).unwrap();
    assert!(rest.is_empty());
    assert_eq!(parsed.id(), tx.id());
    assert!(parsed.verify(&mut chain).unwrap());
}

#[test]
fn wrong_key_cannot_spend() {
    let alice = key(1001);
    let mallory = key(666);
    let mut chain = FakeChain::default();

    let funding = funding_tx(vec![TxOut::new(
        50_000,
        Script::p2pkh(&alice.point().hash160(true)),
    )]);
    let funding_hash = chain.add(funding);

    let mut tx = Tx::new(
        1,
        vec![TxIn::new(funding_hash, 0)],
        vec![TxOut::new(
            49_000,
            Script::p2pkh(&mallory.point().hash160(true)),
        )],
        0,
        true,
    );

    // sign_input reports the failed verification.
    assert!(!tx.sign_input(&mut chain, 0, &mallory).unwrap());
    assert!(!tx.verify(&mut chain).unwrap());
}

#[test]
fn bare_two_of_three_multisig_spend() {
    let keys = [key(101), key(202), key(303)];
    let mut chain = FakeChain::default();

    // scriptPubkey: OP_2 <sec1> <sec2> <sec3> OP_3 OP_CHECKMULTISIG.
    let mut cmds = vec![Cmd::Op(opcode::OP_2)];
    cmds.extend(keys.iter().map(|k| Cmd::Data(k.point().sec(true))));
    cmds.push(Cmd::Op(opcode::OP_3));
    cmds.push(Cmd::Op(opcode::OP_CHECKMULTISIG));
    let multisig = Script::new(cmds);

    let funding = funding_tx(vec![TxOut::new(30_000, multisig.clone())]);
    let funding_hash = chain.add(funding);

    let mut tx = Tx::new(
        1,
        vec![TxIn::new(funding_hash, 0)],
        vec![TxOut::new(
            29_000,
            Script::p2pkh(&keys[0].point().hash160(true)),
        )],
        0,
        true,
    );

    let z = tx.sig_hash(&mut chain, 0, None).unwrap();
    let sig_for = |k: &PrivateKey| {
        let mut der = k.sign(&z).der();
        der.push(0x01);
        der
    };

    // Keys 0 and 2, in pubkey order, plus the dummy element.
    tx.tx_ins[0].script_sig = Script::new(vec![
        Cmd::Op(opcode::OP_0),
        Cmd::Data(sig_for(&keys[0])),
        Cmd::Data(sig_for(&keys[2])),
    ]);
    assert!(tx.verify_input(&mut chain, 0).unwrap());

    // Same signatures out of order fail.
    tx.tx_ins[0].script_sig = Script::new(vec![
        Cmd::Op(opcode::OP_0),
        Cmd::Data(sig_for(&keys[2])),
        Cmd::Data(sig_for(&keys[0])),
    ]);
    assert!(!tx.verify_input(&mut chain, 0).unwrap());
}

#[test]
fn p2sh_wrapped_multisig_spend() {
    let keys = [key(404), key(505)];
    let mut chain = FakeChain::default();

    let mut cmds = vec![Cmd::Op(opcode::OP_2)];
    cmds.extend(keys.iter().map(|k| Cmd::Data(k.point().sec(true))));
    cmds.push(Cmd::Op(opcode::OP_2));
    cmds.push(Cmd::Op(opcode::OP_CHECKMULTISIG));
    let redeem = Script::new(cmds);
    let mut raw_redeem = Vec::new();
    redeem.raw_serialize(&mut raw_redeem);

    let funding = funding_tx(vec![TxOut::new(
        20_000,
        Script::p2sh(&hash160(&raw_redeem)),
    )]);
    let funding_hash = chain.add(funding);

    let mut tx = Tx::new(
        1,
        vec![TxIn::new(funding_hash, 0)],
        vec![TxOut::new(
            19_000,
            Script::p2pkh(&keys[0].point().hash160(true)),
        )],
        0,
        true,
    );

    // The signature hash commits to the redeem script, not the wrapper.
    let z = tx.sig_hash(&mut chain, 0, Some(&redeem)).unwrap();
    let mut sigs: Vec<Cmd> = vec![Cmd::Op(opcode::OP_0)];
    for k in &keys {
        let mut der = k.sign(&z).der();
        der.push(0x01);
        sigs.push(Cmd::Data(der));
    }
    sigs.push(Cmd::Data(raw_redeem));
    tx.tx_ins[0].script_sig = Script::new(sigs);

    assert!(tx.verify_input(&mut chain, 0).unwrap());
    assert!(tx.verify(&mut chain).unwrap());
}

#[test]
fn locktime_guarded_output() {
    let owner = key(7007);
    let mut chain = FakeChain::default();

    // <800000> CLTV DROP DUP HASH160 <h160> EQUALVERIFY CHECKSIG
    let mut cmds = vec![
        Cmd::Data(vec![0x00, 0x35, 0x0c]),
        Cmd::Op(opcode::OP_CHECKLOCKTIMEVERIFY),
        Cmd::Op(opcode::OP_DROP),
    ];
    cmds.extend(Script::p2pkh(&owner.point().hash160(true)).cmds().to_vec());
    let guarded = Script::new(cmds);

    let funding = funding_tx(vec![TxOut::new(10_000, guarded)]);
    let funding_hash = chain.add(funding);

    let build = |locktime: u32, sequence: u32, chain: &mut FakeChain| {
        let mut tx_in = TxIn::new(funding_hash, 0);
        tx_in.sequence = sequence;
        let mut tx = Tx::new(
            1,
            vec![tx_in],
            vec![TxOut::new(
                9_000,
                Script::p2pkh(&owner.point().hash160(true)),
            )],
            locktime,
            true,
        );
        tx.sign_input(chain, 0, &owner).unwrap()
    };

    // Locktime past the threshold unlocks; an earlier one doesn't, and a
    // final sequence disables the check entirely.
    assert!(build(800_000, 0xffff_fffe, &mut chain));
    assert!(!build(700_000, 0xffff_fffe, &mut chain));
    assert!(!build(800_000, 0xffff_ffff, &mut chain));
}

#[test]
fn header_difficulty_transitions() {
    // A synthetic header chain at the lowest difficulty.
    let header = BlockHeader {
        version: 0x2000_0000,
        prev_block: [0; 32],
        merkle_root: [0; 32],
        timestamp: 1_600_000_000,
        bits: bitx_common::types::block::LOWEST_BITS,
        nonce: 0,
    };
    assert_eq!(header.difficulty(), BigUint::from(1u8));

    // A window mined exactly on schedule keeps its bits.
    assert_eq!(
        bitx_common::types::block::calculate_new_bits(
            header.bits,
            bitx_common::types::block::TWO_WEEKS
        ),
        header.bits
    );
}
