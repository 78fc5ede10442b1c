//! End-to-end judging scenarios

mod common;

use common::*;
use record_store::{Direction, TradePlan, TradeType};
use trade_judge::{judge, AbstainReason, JudgeConfig, JudgeEngine, ProposedTrade};

#[test]
fn test_consistent_long_winners_recommend_long() {
    let trades = closed_trades(40, Direction::Long, 1.5);
    let result = judge(&proposal(), &trades, &JudgeConfig::default());

    assert_eq!(result.recommendation, Direction::Long);
    assert_eq!(result.win_rate, Some(100.0));
    assert!((result.ev.unwrap() - 1.5).abs() < 1e-9);
    assert_eq!(result.pseudo_case_count, 40);
    assert!((result.confidence - 93.66).abs() < 0.01);
    assert!(result.confidence < 100.0);
    assert_eq!(result.expected_move, Some(120.0));
    assert!(result.reason.is_none());
    assert_eq!(result.ess, Some(40.0));
}

#[test]
fn test_pseudo_case_count_respects_cap() {
    let trades = closed_trades(90, Direction::Long, 1.5);
    let result = judge(&proposal(), &trades, &JudgeConfig::default());
    assert_eq!(result.recommendation, Direction::Long);
    assert_eq!(result.pseudo_case_count, 60);
    let selection = result.diagnostics.selection.unwrap();
    assert_eq!(selection.dropped_cap, 30);
    assert_eq!(selection.top_scores, vec![1.0; 5]);
}

#[test]
fn test_low_risk_reward_abstains() {
    let trades = closed_trades(40, Direction::Long, 1.5);
    // reward 40, risk 50
    let query = ProposedTrade::new(
        SYMBOL,
        TIMEFRAME,
        TradePlan::new(Direction::Long, 38000.0, 38040.0, 37950.0),
    )
    .with_indicators(indicators());
    let result = judge(&query, &trades, &JudgeConfig::default());

    assert_eq!(result.recommendation, Direction::Flat);
    assert!(matches!(
        result.abstain,
        Some(AbstainReason::RiskRewardBelowFloor { floor, .. }) if floor == 1.0
    ));
    assert!(result.reason.unwrap().contains("RR floor"));
    assert_eq!(result.pseudo_case_count, 0);
    assert_eq!(result.confidence, 0.0);
    assert!(result.win_rate.is_none());
}

#[test]
fn test_too_few_cases_abstains() {
    let trades = closed_trades(5, Direction::Long, 1.5);
    let result = judge(&proposal(), &trades, &JudgeConfig::default());

    assert_eq!(result.recommendation, Direction::Flat);
    assert_eq!(
        result.abstain,
        Some(AbstainReason::TooFewCases { count: 5, min: 30 })
    );
    assert_eq!(result.pseudo_case_count, 5);
    assert!(result.reason.unwrap().contains("need at least 30"));
}

#[test]
fn test_close_expectancies_abstain_on_gap() {
    let trades: Vec<_> = (0..80)
        .map(|i| {
            if i % 2 == 0 {
                closed_trade(i, Direction::Long, 1.0)
            } else {
                closed_trade(i, Direction::Short, 0.99)
            }
        })
        .collect();
    let config = JudgeConfig {
        ev_gap_r: 0.05,
        ..JudgeConfig::default()
    };
    let result = judge(&proposal(), &trades, &config);

    assert_eq!(result.recommendation, Direction::Flat);
    match result.abstain {
        Some(AbstainReason::DirectionTooClose { gap, min_gap }) => {
            assert!((gap - 0.01).abs() < 1e-9);
            assert_eq!(min_gap, 0.05);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    let stats = result.diagnostics.stats.unwrap();
    assert_eq!(stats.long.n, 30);
    assert_eq!(stats.short.n, 30);
}

#[test]
fn test_other_markets_are_ignored() {
    let mut trades = closed_trades(40, Direction::Long, 1.5);
    let mut elsewhere = closed_trades(40, Direction::Short, 3.0);
    for t in elsewhere.iter_mut() {
        t.timeframe = "15m".into();
    }
    trades.extend(elsewhere);

    let result = judge(&proposal(), &trades, &JudgeConfig::default());
    assert_eq!(result.recommendation, Direction::Long);
    assert_eq!(result.diagnostics.selection.unwrap().dropped_outcome, 40);
}

#[test]
fn test_trade_type_filter() {
    let mut trades = closed_trades(40, Direction::Long, 1.5);
    for t in trades.iter_mut().skip(20) {
        t.trade_type = Some(TradeType::Practice);
    }
    let engine = JudgeEngine::new(JudgeConfig {
        allowed_trade_types: vec![TradeType::Real],
        ..JudgeConfig::default()
    });
    let result = engine.judge(&proposal(), &trades);
    assert_eq!(result.abstain, Some(AbstainReason::TooFewCases { count: 20, min: 30 }));
}

#[test]
fn test_win_rate_threshold_from_proposal() {
    let mut trades = closed_trades(40, Direction::Long, 2.0);
    for t in trades.iter_mut().take(20) {
        t.r_multiple = Some(-1.0);
    }
    let strict = proposal().with_min_win_rate(60.0);
    let result = judge(&strict, &trades, &JudgeConfig::default());
    assert_eq!(
        result.abstain,
        Some(AbstainReason::WinRateBelowMinimum { win_rate: 50.0, min: 60.0 })
    );
    assert_eq!(result.min_win_rate, 60.0);

    let lenient = proposal().with_min_win_rate(50.0);
    let result = judge(&lenient, &trades, &JudgeConfig::default());
    assert_eq!(result.recommendation, Direction::Long);
    assert!(result.confidence < 50.0);
}

#[test]
fn test_prefiltered_history_gives_same_result() {
    use record_store::{RecordStore, TradeRecord};

    let records: Vec<TradeRecord> = serde_json::from_str(
        r#"[
            {"id": "a", "symbol": "X", "timeframe": "1時間足", "hasResult": true,
             "directionPlanned": "long", "directionTaken": "long",
             "entryPrice": 100, "exitPrice": 110, "cutLossPrice": 95, "feePerUnit": 0,
             "plannedLimitPrice": 110, "macd_state": "golden"},
            {"id": "b", "symbol": "Y", "timeframe": "1h", "hasResult": true,
             "directionPlanned": "long", "entryPrice": 100, "exitPrice": 90,
             "cutLossPrice": 95, "feePerUnit": 0, "plannedLimitPrice": 110}
        ]"#,
    )
    .unwrap();
    let store = RecordStore::from_records(records);
    let query = ProposedTrade::new("X", "1h", TradePlan::new(Direction::Long, 100.0, 110.0, 95.0));
    let config = JudgeConfig {
        min_cases: 1,
        min_ess: 0.5,
        min_comparable_features: 1,
        ..JudgeConfig::default()
    };

    let full = judge(&query, store.trades(), &config);
    let subset = judge(&query, &store.prefilter("X", "1h"), &config);
    assert_eq!(full.recommendation, Direction::Long);
    assert_eq!(full.recommendation, subset.recommendation);
    assert_eq!(full.ev, subset.ev);
    assert_eq!(full.confidence, subset.confidence);
    assert_eq!(full.pseudo_case_count, 1);
}
