extern crate bitcoinlib;
extern crate hex;

use bitcoinlib::{Block, ParseOptions};

// Bitcoin genesis block
const RAW_BLOCK: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c0101000000010000000000000000000000000000000000000000000000000000000000000000ffffffff4d04ffff001d0104455468652054696d65732030332f4a616e2f32303039204368616e63656c6c6f72206f6e206272696e6b206f66207365636f6e64206261696c6f757420666f722062616e6b73ffffffff0100f2052a01000000434104678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5fac00000000";

fn main() {
    let raw_block = hex::decode(RAW_BLOCK).unwrap();
    let options = ParseOptions {
        parse_transactions: true,
        height: Some(0),
        ..Default::default()
    };
    let block = Block::from_raw(&raw_block, options).unwrap();
    println!("{}", block);
    println!("difficulty {}, target {}", block.difficulty(), block.target_hex());
    println!("proof of work valid: {}", block.check_proof_of_work());
    println!("merkle root valid: {}", block.check_merkle_root().unwrap());
    let coinbase = block.coinbase().unwrap();
    println!("coinbase script {}", coinbase.inputs[0].script.as_hex());
    println!("coinbase output script {}", coinbase.outputs[0].script.as_hex());
}
