extern crate bitcoinlib;

use bitcoinlib::{BlockBuilder, H256Le, Script};

fn main() {
    let previous = H256Le::from_hex_be("0f9188f13cb7b2c71f2a335e3a4fc328bf5beb436012afca590b1a11466e2206").unwrap();
    let block = BlockBuilder::new(1)
        .with_previous_hash(previous)
        .with_timestamp(1296688602)
        .with_coinbase_data(b"/regtest/")
        .with_coinbase_output(Script::try_from("51").unwrap(), 50 * 100_000_000)
        .mine()
        .unwrap();
    println!("{}", block);
    println!("nonce {}, bips {:?}", block.nonce(), block.version_bips());
    println!("{}", hex::encode(block.serialize().unwrap()));
}
