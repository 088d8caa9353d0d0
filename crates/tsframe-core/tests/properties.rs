use proptest::prelude::*;
use tsframe_core::{
    Duration, PartialSpec, RangeEnd, Reduction, Resolution, TimeError, TimeIndex, TimeSeries,
    Timestamp,
};

const YEAR_2000: i64 = 946_684_800_000_000_000;
const YEAR_2030: i64 = 1_893_456_000_000_000_000;

fn arb_value() -> impl Strategy<Value = Option<f64>> {
    prop::option::weighted(0.8, -1_000.0f64..1_000.0)
}

fn arb_unique_stamps() -> impl Strategy<Value = Vec<Timestamp>> {
    prop::collection::btree_set(YEAR_2000..YEAR_2030, 1..60)
        .prop_map(|set| set.into_iter().map(Timestamp::from_ticks).collect())
}

fn daily(values: Vec<Option<f64>>) -> TimeSeries {
    let start: Timestamp = "2017-01-01".parse().unwrap();
    let index = TimeIndex::range_str(start, RangeEnd::Periods(values.len()), "D").unwrap();
    TimeSeries::new(index, values).unwrap()
}

proptest! {
    #[test]
    fn difference_round_trips(a in -2_000_000_000_000_000_000i64..2_000_000_000_000_000_000, gap in 1i64..2_000_000_000_000_000_000) {
        let a = Timestamp::from_ticks(a);
        let b = Timestamp::from_ticks(a.ticks() + gap);
        prop_assert!(a < b);
        prop_assert_eq!(a + (b - a), b);
    }

    #[test]
    fn exact_lookup_inverts_position_lookup(stamps in arb_unique_stamps(), pick in any::<prop::sample::Index>()) {
        let index = TimeIndex::new(stamps);
        let pos = pick.index(index.len());
        let ts = index.position_lookup(pos as isize).unwrap();
        prop_assert_eq!(index.exact_lookup(ts).unwrap(), pos);
    }

    #[test]
    fn shift_back_restores_interior(values in prop::collection::vec(arb_value(), 1..50), n in 0i64..60) {
        let series = daily(values.clone());
        let restored = series.shift(n).shift(-n);
        let len = values.len() as i64;
        for (i, v) in restored.values().iter().enumerate() {
            if (i as i64) < len - n {
                prop_assert_eq!(*v, values[i]);
            } else {
                prop_assert_eq!(*v, None);
            }
        }
    }

    #[test]
    fn native_frequency_sum_is_identity(values in prop::collection::vec(-1_000.0f64..1_000.0, 1..50)) {
        let series = daily(values.iter().copied().map(Some).collect());
        let out = series.resample("D").unwrap().sum().unwrap();
        prop_assert_eq!(out.values(), series.values());
        prop_assert_eq!(out.index().as_slice(), series.index().as_slice());
    }

    #[test]
    fn counts_are_conserved(values in prop::collection::vec(arb_value(), 1..80), freq in prop::sample::select(vec!["2D", "7D", "W", "M", "B"])) {
        let series = daily(values.clone());
        let counts = series.resample(freq).unwrap().count().unwrap();
        let total: f64 = counts.values().iter().map(|v| v.unwrap_or(0.0)).sum();
        let present = values.iter().filter(|v| v.is_some()).count();
        prop_assert_eq!(total as usize, present);
        prop_assert!(counts.index().is_sorted());
    }

    #[test]
    fn partial_year_lookup_is_maximal(stamps in arb_unique_stamps(), year in 2000i32..2030) {
        let index = TimeIndex::new(stamps);
        let spec = PartialSpec::new(Timestamp::from_ymd(year, 1, 1).unwrap(), Resolution::Year).unwrap();
        match index.partial_lookup(&spec) {
            Ok(range) => {
                for (pos, ts) in index.iter().enumerate() {
                    prop_assert_eq!(range.contains(&pos), ts.year() == year);
                }
            }
            Err(err) => {
                prop_assert_eq!(err, TimeError::NotFound(spec.to_string()));
                prop_assert!(index.iter().all(|ts| ts.year() != year));
            }
        }
    }

    #[test]
    fn interpolation_is_linear(a in -1_000.0f64..1_000.0, b in -1_000.0f64..1_000.0) {
        let series = daily(vec![Some(a), Some(b)]);
        let out = series.resample("6h").unwrap().interpolate().unwrap();
        prop_assert_eq!(out.len(), 5);
        let mid = out.values()[2].unwrap();
        prop_assert!((mid - (a + b) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn tshift_moves_every_stamp(values in prop::collection::vec(arb_value(), 0..30), hours in -1_000i64..1_000) {
        let series = daily(values);
        let delta = Duration::hours(hours);
        let moved = &series + delta;
        for (before, after) in series.index().iter().zip(moved.index().iter()) {
            prop_assert_eq!(after - before, delta);
        }
        prop_assert_eq!(moved.values(), series.values());
    }

    #[test]
    fn skip_sum_matches_present_values(values in prop::collection::vec(arb_value(), 0..30)) {
        let series = daily(values.clone());
        let expected: f64 = values.iter().flatten().sum();
        match series.reduce(Reduction::Sum, tsframe_core::MissingPolicy::Skip) {
            Some(sum) => prop_assert!((sum - expected).abs() < 1e-6),
            None => prop_assert!(values.iter().all(Option::is_none)),
        }
    }
}
