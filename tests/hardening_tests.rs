//! Hardening Tests
//!
//! Attacker-supplied bytes, text and proofs must fail cleanly, within the
//! configured limits, and never panic.

/// Encoded values from untrusted peers
mod codec_input {
    use gtv_core::{decode, decode_with_limits, encode, CodecLimits, Gtv, GtvError};

    #[test]
    fn test_huge_declared_length_is_refused_up_front() {
        let bytes = [0xA5, 0x84, 0xFF, 0xFF, 0xFF, 0xFF, 0x30];
        assert!(matches!(decode(&bytes), Err(GtvError::LimitExceeded(_))));
    }

    #[test]
    fn test_length_longer_than_buffer() {
        let bytes = [0xA2, 0x10, 0x0C, 0x0E, b'x'];
        assert!(matches!(decode(&bytes), Err(GtvError::MalformedEncoding { .. })));
    }

    #[test]
    fn test_indefinite_length_is_rejected() {
        let bytes = [0xA5, 0x80, 0x30, 0x80, 0x00, 0x00, 0x00, 0x00];
        assert!(matches!(decode(&bytes), Err(GtvError::MalformedEncoding { .. })));
    }

    #[test]
    fn test_depth_bomb() {
        let mut value = Gtv::Null;
        for _ in 0..500 {
            value = Gtv::Array(vec![value]);
        }
        let bytes = encode(&value);
        assert!(matches!(decode(&bytes), Err(GtvError::LimitExceeded(_))));

        let relaxed = CodecLimits {
            max_depth: 1000,
            ..CodecLimits::default()
        };
        assert_eq!(decode_with_limits(&bytes, &relaxed).unwrap(), value);
    }

    #[test]
    fn test_every_truncation_fails() {
        let bytes = encode(&Gtv::dict([
            ("a", Gtv::array([1, 2, 3])),
            ("b", Gtv::bytes(vec![7; 200])),
        ]));
        for end in 0..bytes.len() {
            assert!(decode(&bytes[..end]).is_err(), "accepted prefix of {end} bytes");
        }
    }
}

/// Text syntax from configuration files and command lines
mod text_input {
    use gtv_core::{parse, GtvError};

    #[test]
    fn test_bracket_bomb() {
        let text = "[".repeat(100_000);
        assert!(matches!(parse(&text), Err(GtvError::LimitExceeded(_))));
    }

    #[test]
    fn test_unterminated_forms() {
        for text in ["[1, 2", "{\"a\": 1", "\"open", "x\"0", "x\"zz\"", "{a = }", "1 2"] {
            assert!(parse(text).is_err(), "accepted {text:?}");
        }
    }
}

/// Proofs from untrusted provers
mod proof_input {
    use gtv_core::proof::{TAG_HASHED_LEAF, TAG_NODE};
    use gtv_core::{
        encode, verify, verify_with_paths, CodecLimits, Gtv, GtvError, GtvMerkleHashCalculator,
        GtvMerkleProofTree, GtvPath, GtvPathSet, Hash, ProofElement,
    };

    #[test]
    fn test_deep_proof_is_refused() {
        let mut element = Gtv::array([Gtv::Integer(TAG_HASHED_LEAF), Gtv::bytes(vec![0; 32])]);
        let leaf = element.clone();
        for _ in 0..300 {
            element = Gtv::array([Gtv::Integer(TAG_NODE), element, leaf.clone()]);
        }
        let bytes = encode(&element);
        let err = GtvMerkleProofTree::deserialize_with_limits(&bytes, &CodecLimits::default())
            .unwrap_err();
        assert!(matches!(err, GtvError::LimitExceeded(_)));
    }

    #[test]
    fn test_short_hash_does_not_verify() {
        let calc = GtvMerkleHashCalculator::sha256();
        let value = Gtv::array([1, 2]);
        let root = value.merkle_hash(&calc);
        let forged = GtvMerkleProofTree::new(ProofElement::HashedLeaf(Hash::new(vec![1, 2, 3])));
        assert!(!verify(&forged, &root, &calc));
    }

    #[test]
    fn test_relabelled_key_is_caught() {
        let calc = GtvMerkleHashCalculator::sha256();
        let value = Gtv::dict([("amount", Gtv::Integer(5)), ("fee", Gtv::Integer(500))]);
        let root = value.merkle_hash(&calc);
        let paths = GtvPathSet::new(["/fee".parse::<GtvPath>().unwrap()]);
        let honest = value.generate_proof(&paths, &calc).unwrap();

        // claim the fee is the amount
        let mut wire = honest.to_gtv();
        let Gtv::Array(items) = &mut wire else { unreachable!() };
        let Gtv::Array(node) = &mut items[4] else { unreachable!() };
        let Gtv::Array(leaf) = &mut node[2] else { unreachable!() };
        assert_eq!(leaf[1], Gtv::from("fee"));
        leaf[1] = Gtv::from("amount");
        let forged = GtvMerkleProofTree::from_gtv(&wire).unwrap();

        assert!(verify(&forged, &root, &calc));
        assert!(matches!(
            verify_with_paths(&forged, &root, &calc),
            Err(GtvError::MalformedProof(_))
        ));
        assert!(verify_with_paths(&honest, &root, &calc).unwrap());
    }
}

/// Streams with oversized records
mod stream_input {
    use gtv_core::{encode, CodecLimits, Gtv, GtvError, GtvStreamReader};

    #[test]
    fn test_oversized_record() {
        let mut buffer = encode(&Gtv::Integer(1));
        buffer.extend(encode(&Gtv::bytes(vec![0; 4096])));
        let limits = CodecLimits {
            max_bytes: 1024,
            ..CodecLimits::default()
        };
        let mut reader = GtvStreamReader::with_limits(buffer.as_slice(), limits);
        assert_eq!(reader.read_next().unwrap(), Some(Gtv::Integer(1)));
        assert!(matches!(reader.read_next(), Err(GtvError::LimitExceeded(_))));
    }
}

/// Nothing panics on arbitrary input
mod fuzz {
    use gtv_core::{decode, parse, GtvMerkleProofTree};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let _ = decode(&bytes);
        }

        #[test]
        fn prop_proof_decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let _ = GtvMerkleProofTree::deserialize(&bytes);
        }

        #[test]
        fn prop_parse_never_panics(text in "[\\[\\]{}\",:=x0-9a-zL \\-]{0,64}") {
            let _ = parse(&text);
        }
    }
}
