//! Accumulator-based LDPC encoding over NRZ values.
//!
//! Works directly on the ±1 representation the modulator consumes: XOR
//! becomes multiplication, so each information bit multiplies its parity
//! accumulators and a final running product turns the accumulators into the
//! transmitted parity bits.

use crate::ldpc_tables::LdpcTable;

pub struct LdpcEncoder {
    table: &'static LdpcTable,
    q: usize,
}

impl LdpcEncoder {
    pub fn new(table: &'static LdpcTable) -> Self {
        let q = (table.n - table.k) / table.m;
        Self { table, q }
    }

    pub fn code_bits(&self) -> usize {
        self.table.n
    }

    pub fn info_bits(&self) -> usize {
        self.table.k
    }

    /// `data` holds the NRZ information bits, `parity` receives the
    /// n - k NRZ parity values.
    pub fn encode(&self, data: &[i8], parity: &mut [i8]) {
        let t = self.table;
        let r = t.n - t.k;
        debug_assert_eq!(data.len(), t.k);
        debug_assert_eq!(parity.len(), r);

        for p in parity.iter_mut() {
            *p = 1;
        }
        let mut bit = 0;
        let mut offset = 0;
        for (&degree, &count) in t.deg.iter().zip(t.len.iter()) {
            for _ in 0..count {
                let row = &t.pos[offset..offset + degree];
                for group in 0..t.m {
                    for &addr in row {
                        let idx = (addr as usize + group * self.q) % r;
                        parity[idx] *= data[bit];
                    }
                    bit += 1;
                }
                offset += degree;
            }
        }
        debug_assert_eq!(bit, t.k);
        debug_assert_eq!(offset, t.pos.len());
        for i in 1..r {
            parity[i] *= parity[i - 1];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ldpc_tables::DVB_T2_TABLE_A3;

    #[test]
    fn test_all_zero_info_gives_all_zero_parity() {
        let enc = LdpcEncoder::new(&DVB_T2_TABLE_A3);
        let data = vec![1i8; enc.info_bits()];
        let mut parity = vec![0i8; enc.code_bits() - enc.info_bits()];
        enc.encode(&data, &mut parity);
        assert!(parity.iter().all(|&p| p == 1));
    }

    #[test]
    fn test_linearity() {
        // the code is linear: encoding the XOR of two words equals the
        // XOR of the encodings, which in NRZ form is elementwise product
        let enc = LdpcEncoder::new(&DVB_T2_TABLE_A3);
        let k = enc.info_bits();
        let r = enc.code_bits() - k;
        let a: Vec<i8> = (0..k).map(|i| if i % 3 == 0 { -1 } else { 1 }).collect();
        let b: Vec<i8> = (0..k).map(|i| if i % 7 == 1 { -1 } else { 1 }).collect();
        let ab: Vec<i8> = a.iter().zip(&b).map(|(&x, &y)| x * y).collect();

        let mut pa = vec![0i8; r];
        let mut pb = vec![0i8; r];
        let mut pab = vec![0i8; r];
        enc.encode(&a, &mut pa);
        enc.encode(&b, &mut pb);
        enc.encode(&ab, &mut pab);
        for i in 0..r {
            assert_eq!(pab[i], pa[i] * pb[i]);
        }
    }

    #[test]
    fn test_output_stays_nrz() {
        let enc = LdpcEncoder::new(&DVB_T2_TABLE_A3);
        let k = enc.info_bits();
        let data: Vec<i8> = (0..k).map(|i| if (i * 31) % 5 < 2 { -1 } else { 1 }).collect();
        let mut parity = vec![0i8; enc.code_bits() - k];
        enc.encode(&data, &mut parity);
        assert!(parity.iter().all(|&p| p == 1 || p == -1));
    }
}
