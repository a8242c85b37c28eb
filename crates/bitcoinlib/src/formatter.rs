use crate::script::Script;
use crate::types::*;

const WITNESS_FLAG: u8 = 0x01;
const WITNESS_MARKER: u8 = 0x00;

/// Type to be formatted as a bytes array
pub trait Formattable {
    fn format_into(&self, formatter: &mut Formatter);

    fn format(&self) -> Vec<u8> {
        let mut formatter = Formatter::new();
        self.format_into(&mut formatter);
        formatter.result()
    }
}

/// Macro to generate `Formattable` implementation of int types
macro_rules! make_formattable_int {
    ($type:ty) => {
        impl Formattable for $type {
            fn format_into(&self, formatter: &mut Formatter) {
                formatter.output(&self.to_le_bytes());
            }
        }
    };
}

// Generate `Formattable` implementation for the basic integers (signed and unsgined) types
make_formattable_int!(u8);
make_formattable_int!(u16);
make_formattable_int!(u32);
make_formattable_int!(u64);
make_formattable_int!(i32);
make_formattable_int!(i64);

impl<T: Formattable> Formattable for &T {
    fn format_into(&self, formatter: &mut Formatter) {
        T::format_into(self, formatter)
    }
}

impl Formattable for H256Le {
    fn format_into(&self, formatter: &mut Formatter) {
        formatter.output(&self.to_bytes_le());
    }
}

impl Formattable for CompactUint {
    fn format_into(&self, formatter: &mut Formatter) {
        if self.value < 0xfd {
            formatter.format(self.value as u8);
        } else if self.value <= u16::MAX as u64 {
            formatter.format(0xfd_u8);
            formatter.format(self.value as u16);
        } else if self.value <= u32::MAX as u64 {
            formatter.format(0xfe_u8);
            formatter.format(self.value as u32);
        } else {
            formatter.format(0xff_u8);
            formatter.format(self.value);
        }
    }
}

/// Vectors are prefixed by their length as a `CompactUint`
impl<T: Formattable> Formattable for Vec<T> {
    fn format_into(&self, formatter: &mut Formatter) {
        formatter.format(CompactUint::from_usize(self.len()));
        for value in self.iter() {
            formatter.format(value);
        }
    }
}

impl Formattable for Script {
    fn format_into(&self, formatter: &mut Formatter) {
        formatter.format(CompactUint::from_usize(self.len()));
        formatter.output(self.as_bytes());
    }
}

impl Formattable for TransactionInput {
    fn format_into(&self, formatter: &mut Formatter) {
        formatter.format(self.previous_hash);
        formatter.format(self.previous_index);
        formatter.format(&self.script);
        formatter.format(self.sequence);
    }
}

impl Formattable for TransactionOutput {
    fn format_into(&self, formatter: &mut Formatter) {
        formatter.format(self.value);
        formatter.format(&self.script);
    }
}

impl Transaction {
    pub(crate) fn format_transaction_into(&self, formatter: &mut Formatter, witness: bool) {
        // NOTE: doesn't format witnesses for tx_id
        let format_witness = witness && self.has_witness();

        formatter.format(self.version);

        if format_witness {
            formatter.format(WITNESS_MARKER);
            formatter.format(WITNESS_FLAG);
        }

        formatter.format(&self.inputs);
        formatter.format(&self.outputs);

        if format_witness {
            for input in self.inputs.iter() {
                formatter.format(&input.witness);
            }
        }

        formatter.format(self.lock_time);
    }
}

impl Formattable for Transaction {
    fn format_into(&self, formatter: &mut Formatter) {
        self.format_transaction_into(formatter, true)
    }
}

impl Formattable for BlockHeader {
    fn format_into(&self, formatter: &mut Formatter) {
        formatter.format(self.version);
        formatter.format(self.hash_prev_block);
        formatter.format(self.merkle_root);
        formatter.format(self.timestamp);
        formatter.format(self.bits);
        formatter.format(self.nonce);
    }
}

pub struct Formatter {
    bytes: Vec<u8>,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Formatter {
        Formatter { bytes: Vec::new() }
    }

    pub fn output(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    pub fn format<T: Formattable>(&mut self, value: T) {
        value.format_into(self);
    }

    pub fn result(self) -> Vec<u8> {
        self.bytes
    }
}
