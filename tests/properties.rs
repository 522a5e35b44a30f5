use ethers_core::types::U256;
use proptest::prelude::*;

use ledger_offline_sign::display::wrap;
use ledger_offline_sign::tx::max_fee_per_gas;
use ledger_offline_sign::validate;

proptest! {
    #[test]
    fn integers_print_back_as_typed(n in any::<u128>()) {
        let typed = n.to_string();
        prop_assert_eq!(validate::non_negative(&typed).unwrap(), U256::from(n));
        prop_assert_eq!(validate::amount_or_zero(&typed).unwrap(), U256::from(n));
    }

    #[test]
    fn decimals_and_signs_are_rejected(n in any::<u64>(), frac in 0u32..1000) {
        let decimal = format!("{n}.{frac}");
        let negative = format!("-{n}");
        prop_assert!(validate::non_negative(&decimal).is_err());
        prop_assert!(validate::non_negative(&negative).is_err());
    }

    #[test]
    fn leading_zeros_are_rejected(n in 1u64..) {
        let padded = format!("0{n}");
        prop_assert!(validate::non_negative(&padded).is_err());
    }

    #[test]
    fn fee_cap_is_the_exact_sum(priority in any::<u64>(), base in any::<u64>()) {
        let expected = U256::from(u128::from(priority) + u128::from(base));
        prop_assert_eq!(
            max_fee_per_gas(U256::from(priority), U256::from(base)),
            Some(expected)
        );
    }

    #[test]
    fn wrapping_keeps_every_character(s in "0x[0-9a-f]{0,300}", width in 1usize..80) {
        let wrapped = wrap(&s, width);
        prop_assert!(wrapped.lines().all(|l| l.len() <= width));
        prop_assert_eq!(wrapped.replace('\n', ""), s);
    }

    #[test]
    fn chain_ids_round_trip(id in 1u64..) {
        prop_assert_eq!(validate::chain_id(&id.to_string()).unwrap(), id);
    }
}
