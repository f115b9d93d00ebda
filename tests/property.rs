use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use wallet_forge::wallet::address_from_private_key;
use wallet_forge::{
    assign_id, derive_from_entropy, is_checksum_address, keccak256, to_checksum_address,
    WordCount,
};

fn any_word_count() -> impl Strategy<Value = WordCount> {
    prop::sample::select(WordCount::ALL.to_vec())
}

fn entropy_for(wc: WordCount) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), wc.entropy_bytes())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn checksum_addresses_match_eip55(bytes in prop::array::uniform20(any::<u8>())) {
        let checksummed = to_checksum_address(&bytes);
        prop_assert!(checksummed.starts_with("0x"));
        prop_assert!(is_checksum_address(&checksummed));

        let lower_expected = hex::encode(bytes);
        let tail = checksummed.trim_start_matches("0x");
        prop_assert_eq!(tail.to_ascii_lowercase(), lower_expected.clone());

        let hash = keccak256(lower_expected.as_bytes());
        for (i, ch) in tail.chars().enumerate() {
            let byte = hash[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if ch.is_ascii_alphabetic() {
                prop_assert_eq!(ch.is_ascii_uppercase(), nibble >= 8);
            }
        }
    }

    #[test]
    fn entropy_derivation_is_deterministic(
        (wc, entropy) in any_word_count().prop_flat_map(|wc| (Just(wc), entropy_for(wc)))
    ) {
        let first = derive_from_entropy(&entropy).unwrap();
        let second = derive_from_entropy(&entropy).unwrap();

        prop_assert_eq!(first.mnemonic().word_count(), wc.words());
        prop_assert_eq!(first.private_key(), second.private_key());
        prop_assert_eq!(first.public_address(), second.public_address());
        prop_assert_eq!(first.mnemonic(), second.mnemonic());

        prop_assert!(is_checksum_address(first.public_address()));
        prop_assert_eq!(
            address_from_private_key(first.private_key()).unwrap(),
            first.public_address()
        );
    }

    #[test]
    fn wallet_ids_are_reproducible(
        bytes in prop::array::uniform20(any::<u8>()),
        secs in 0i64..4_102_444_800,
        block in any::<u64>(),
    ) {
        let address = to_checksum_address(&bytes);
        let at = Utc.timestamp_opt(secs, 0).unwrap();

        let id = assign_id(&address, &at, block);
        prop_assert_eq!(&id, &assign_id(&address, &at, block));
        prop_assert_ne!(&id, &assign_id(&address, &at, block.wrapping_add(1)));
    }
}
