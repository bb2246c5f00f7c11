use crop_core::{fixed, LabelEncoder};
use proptest::prelude::*;

proptest! {
    #[test]
    fn encoder_is_a_bijection_over_its_codes(
        labels in prop::collection::vec("[a-z]{1,8}", 1..60)
    ) {
        let (encoder, codes) = LabelEncoder::fit_transform(&labels).unwrap();

        for code in 0..encoder.n_classes() as u32 {
            let label = encoder.decode(code).unwrap();
            prop_assert_eq!(encoder.encode(label).unwrap(), code);
        }

        let decoded = encoder.inverse_transform(&codes).unwrap();
        prop_assert_eq!(decoded, labels.clone());

        prop_assert!(codes.iter().all(|&c| (c as usize) < encoder.n_classes()));
        prop_assert!(encoder.decode(encoder.n_classes() as u32).is_err());
    }
}

proptest! {
    #[test]
    fn equal_labels_share_codes(
        labels in prop::collection::vec(
            prop::sample::select(vec!["rice", "maize", "jute", "mango"]),
            1..40,
        )
    ) {
        let (_, codes) = LabelEncoder::fit_transform(&labels).unwrap();

        for i in 0..labels.len() {
            for j in 0..labels.len() {
                prop_assert_eq!(labels[i] == labels[j], codes[i] == codes[j]);
            }
        }
    }
}

proptest! {
    #[test]
    fn fixed_point_preserves_order(a in -1.0e6f64..1.0e6, b in -1.0e6f64..1.0e6) {
        let fa = fixed::to_fixed(a).unwrap();
        let fb = fixed::to_fixed(b).unwrap();
        if a <= b {
            prop_assert!(fa <= fb);
        } else {
            prop_assert!(fa >= fb);
        }
    }
}
