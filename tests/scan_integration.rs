
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;

use cradle_screener::DetectorMode;
use cradle_screener::config::ScanConfig;
use cradle_screener::domain::{DetectedOn, Direction, MarketKind, Timeframe};
use cradle_screener::engine::{CancelFlag, ScanEvent, ScanState, Scanner, ScreenerEngine};

use mock_provider::*;

fn config(timeframes: Vec<Timeframe>) -> ScanConfig {
    ScanConfig {
        timeframes,
        throttle_ms: 0,
        ..ScanConfig::default()
    }
}

fn symbols(signals: &[cradle_screener::SetupSignal]) -> Vec<&str> {
    signals.iter().map(|s| s.symbol.as_str()).collect()
}

#[tokio::test]
async fn buckets_are_bullish_first_and_split_by_candle() {
    let mock = MockProvider::new();
    mock.reply("AAAUSDT", Reply::Candles(bearish_setup()));
    mock.reply("BBBUSDT", Reply::Candles(bullish_setup()));
    mock.reply("CCCUSDT", Reply::Candles(bearish_setup()));
    mock.reply("DDDUSDT", Reply::Candles(bullish_setup()));
    mock.reply("EEEUSDT", Reply::Candles(bullish_setup_one_back()));
    mock.reply("FFFUSDT", Reply::Candles(flat(40)));
    let universe: Vec<_> = ["AAAUSDT", "BBBUSDT", "CCCUSDT", "DDDUSDT", "EEEUSDT", "FFFUSDT"]
        .into_iter()
        .map(swap)
        .collect();

    let cfg = config(vec![Timeframe::H1]);
    let state = Scanner::new(&mock, &cfg)
        .run_cycle(ScanState::default(), &universe)
        .await;

    assert!(!state.is_running());
    assert!(state.last_scanned.is_some());
    let report = state.report_for(Timeframe::H1).unwrap();
    assert_eq!(
        symbols(&report.current),
        vec!["BBBUSDT", "DDDUSDT", "AAAUSDT", "CCCUSDT"]
    );
    assert_eq!(symbols(&report.second_last), vec!["EEEUSDT"]);
    assert!(report.current.iter().all(|s| s.detected_on == DetectedOn::CurrentCandle));
    assert_eq!(report.second_last[0].direction, Direction::Bullish);
    assert_eq!(report.current[0].reference_close, 125.0);
    assert_eq!(report.scanned, 6);
    assert!(report.failures.is_empty());
    assert_eq!(state.total_signals(), 5);
}

#[tokio::test]
async fn failing_symbols_are_skipped_not_fatal() {
    let mock = MockProvider::new();
    mock.reply("AAAUSDT", Reply::Fail);
    mock.reply("BBBUSDT", Reply::Candles(bullish_setup()));
    // CCCUSDT has no reply: unknown symbol
    let mut broken = bullish_setup();
    broken.swap(3, 4);
    mock.reply("DDDUSDT", Reply::Candles(broken));
    let universe: Vec<_> = ["AAAUSDT", "BBBUSDT", "CCCUSDT", "DDDUSDT"]
        .into_iter()
        .map(swap)
        .collect();

    let cfg = config(vec![Timeframe::H4, Timeframe::D1]);
    let state = Scanner::new(&mock, &cfg)
        .run_cycle(ScanState::default(), &universe)
        .await;

    assert_eq!(state.reports.len(), 2);
    for report in &state.reports {
        assert_eq!(symbols(&report.current), vec!["BBBUSDT"]);
        let failed: Vec<&str> = report.failures.iter().map(|f| f.symbol.as_str()).collect();
        assert_eq!(failed, vec!["AAAUSDT", "CCCUSDT", "DDDUSDT"]);
        assert_eq!(report.scanned, 1);
    }
    assert!(state.failures().any(|f| f.reason.contains("does not increase")));
    assert_eq!(mock.fetched_symbols().len(), 8);
}

#[tokio::test]
async fn short_series_are_skipped_silently() {
    let mock = MockProvider::new();
    mock.reply("AAAUSDT", Reply::Candles(flat(2)));
    mock.reply("BBBUSDT", Reply::Candles(Vec::new()));
    mock.reply("CCCUSDT", Reply::Candles(flat(3)));
    let universe: Vec<_> = ["AAAUSDT", "BBBUSDT", "CCCUSDT"].into_iter().map(swap).collect();

    let cfg = config(vec![Timeframe::H1]);
    let state = Scanner::new(&mock, &cfg)
        .run_cycle(ScanState::default(), &universe)
        .await;

    let report = &state.reports[0];
    assert_eq!(report.skipped_insufficient, 2);
    assert_eq!(report.scanned, 1);
    assert!(report.failures.is_empty());
    assert_eq!(report.signal_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn throttle_spaces_fetches_within_a_timeframe() {
    let mock = MockProvider::new();
    for s in ["AAAUSDT", "BBBUSDT", "CCCUSDT"] {
        mock.reply(s, Reply::Candles(flat(10)));
    }
    let universe: Vec<_> = ["AAAUSDT", "BBBUSDT", "CCCUSDT"].into_iter().map(swap).collect();
    let cfg = ScanConfig {
        throttle_ms: 300,
        ..config(vec![Timeframe::H1])
    };

    let start = tokio::time::Instant::now();
    Scanner::new(&mock, &cfg)
        .run_cycle(ScanState::default(), &universe)
        .await;

    let times = mock.fetch_times();
    assert_eq!(times.len(), 3);
    assert!(times[0] - start < Duration::from_millis(300));
    for pair in times.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(300));
    }
}

#[tokio::test(start_paused = true)]
async fn hung_fetch_times_out_and_scan_moves_on() {
    let mock = MockProvider::new();
    mock.reply("AAAUSDT", Reply::Hang);
    mock.reply("BBBUSDT", Reply::Candles(bullish_setup()));
    let universe: Vec<_> = ["AAAUSDT", "BBBUSDT"].into_iter().map(swap).collect();
    let cfg = ScanConfig {
        fetch_timeout_ms: 1_000,
        ..config(vec![Timeframe::H1])
    };

    let state = Scanner::new(&mock, &cfg)
        .run_cycle(ScanState::default(), &universe)
        .await;

    let report = &state.reports[0];
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].reason.starts_with("no response within"));
    assert_eq!(symbols(&report.current), vec!["BBBUSDT"]);
}

#[tokio::test]
async fn cancel_stops_at_the_next_symbol() {
    let flag = CancelFlag::new();
    let mock = MockProvider {
        cancel_after: Some((2, flag.clone())),
        ..MockProvider::new()
    };
    let names = ["AAAUSDT", "BBBUSDT", "CCCUSDT", "DDDUSDT"];
    for s in names {
        mock.reply(s, Reply::Candles(bullish_setup()));
    }
    let universe: Vec<_> = names.into_iter().map(swap).collect();

    let cfg = config(vec![Timeframe::H1, Timeframe::H4]);
    let state = Scanner::new(&mock, &cfg)
        .with_cancel(flag)
        .run_cycle(ScanState::default(), &universe)
        .await;

    assert!(state.cancelled);
    assert!(!state.is_running());
    assert_eq!(mock.fetched_symbols(), vec!["AAAUSDT", "BBBUSDT"]);
    assert_eq!(state.reports.len(), 1);
    assert!(state.reports[0].cancelled);
    assert_eq!(symbols(&state.reports[0].current), vec!["AAAUSDT", "BBBUSDT"]);
}

#[tokio::test(start_paused = true)]
async fn cancel_during_throttle_pause_skips_the_next_fetch() {
    let flag = CancelFlag::new();
    let mock = MockProvider::new();
    mock.reply("AAAUSDT", Reply::Candles(bullish_setup()));
    mock.reply("BBBUSDT", Reply::Candles(bullish_setup()));
    let universe: Vec<_> = ["AAAUSDT", "BBBUSDT"].into_iter().map(swap).collect();
    let cfg = ScanConfig {
        throttle_ms: 300,
        ..config(vec![Timeframe::H1])
    };

    let scanner = Scanner::new(&mock, &cfg).with_cancel(flag.clone());
    let stop = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        flag.cancel();
    };
    let (state, ()) = tokio::join!(scanner.run_cycle(ScanState::default(), &universe), stop);

    assert_eq!(mock.fetched_symbols(), vec!["AAAUSDT"]);
    assert!(state.cancelled);
    assert_eq!(state.reports.len(), 1);
    assert!(state.reports[0].cancelled);
    assert_eq!(symbols(&state.reports[0].current), vec!["AAAUSDT"]);
}

#[tokio::test]
async fn manual_run_after_a_cancelled_one_scans_again() {
    let mock = MockProvider::new();
    mock.set_listing(Some(vec![swap("BTCUSDT"), swap("ETHUSDT")]));
    mock.reply("BTCUSDT", Reply::Candles(bullish_setup()));
    mock.reply("ETHUSDT", Reply::Candles(bearish_setup()));

    let mut engine = ScreenerEngine::new(Arc::new(mock.clone()), config(vec![Timeframe::H1]));
    engine.cancel_flag().cancel();
    let state = engine.run_manual().await;
    assert!(!state.cancelled);
    assert_eq!(state.total_signals(), 2);
    assert!(!engine.cancel_flag().is_cancelled());
}

#[tokio::test]
async fn scheduled_cycle_keeps_a_pending_stop() {
    let mock = MockProvider::new();
    mock.set_listing(Some(vec![swap("BTCUSDT")]));
    mock.reply("BTCUSDT", Reply::Candles(bullish_setup()));
    let cfg = ScanConfig {
        auto_run: true,
        ..config(vec![Timeframe::H1])
    };

    let mut engine = ScreenerEngine::new(Arc::new(mock.clone()), cfg);
    engine.cancel_flag().cancel();
    let state = engine.on_tick(1_700_002_800 + 5).await.unwrap();
    assert!(state.cancelled);
    assert!(mock.fetched_symbols().is_empty());
    assert!(engine.cancel_flag().is_cancelled());
}

#[tokio::test]
async fn historical_mode_reports_bullish_breakout_only() {
    let mock = MockProvider::new();
    mock.reply("AAAUSDT", Reply::Candles(bearish_setup()));
    mock.reply("BBBUSDT", Reply::Candles(historical_breakout()));
    mock.reply("CCCUSDT", Reply::Candles(bullish_setup()));
    let universe: Vec<_> = ["AAAUSDT", "BBBUSDT", "CCCUSDT"].into_iter().map(swap).collect();

    let mut cfg = config(vec![Timeframe::H4]);
    cfg.detector.mode = DetectorMode::Historical;
    let state = Scanner::new(&mock, &cfg)
        .run_cycle(ScanState::default(), &universe)
        .await;

    let report = state.report_for(Timeframe::H4).unwrap();
    assert_eq!(symbols(&report.current), vec!["BBBUSDT"]);
    assert_eq!(report.current[0].direction, Direction::Bullish);
    assert_eq!(report.current[0].reference_close, 125.0);
    assert!(report.second_last.is_empty());
    assert_eq!(report.scanned, 3);

    // The live rule sees the same pull-back one candle back instead.
    cfg.detector.mode = DetectorMode::Live;
    let live = Scanner::new(&mock, &cfg)
        .run_cycle(ScanState::default(), &[swap("BBBUSDT")])
        .await;
    assert!(live.reports[0].current.is_empty());
    assert_eq!(symbols(&live.reports[0].second_last), vec!["BBBUSDT"]);
}

#[tokio::test]
async fn trigger_while_running_is_dropped() {
    let mock = MockProvider::new();
    mock.reply("AAAUSDT", Reply::Candles(bullish_setup()));
    let cfg = config(vec![Timeframe::H1]);
    let started = Utc::now();
    let running = ScanState::default().begin(started);

    let state = Scanner::new(&mock, &cfg)
        .run_cycle(running, &[swap("AAAUSDT")])
        .await;

    assert!(state.is_running());
    assert_eq!(state.last_scanned, Some(started));
    assert!(state.reports.is_empty());
    assert!(mock.fetched_symbols().is_empty());
}

#[tokio::test]
async fn events_cover_the_whole_cycle() {
    let mock = MockProvider::new();
    mock.reply("AAAUSDT", Reply::Fail);
    mock.reply("BBBUSDT", Reply::Candles(bullish_setup()));
    let universe: Vec<_> = ["AAAUSDT", "BBBUSDT"].into_iter().map(swap).collect();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let cfg = config(vec![Timeframe::H1, Timeframe::D1]);
    Scanner::new(&mock, &cfg)
        .with_events(Some(tx))
        .run_cycle(ScanState::default(), &universe)
        .await;

    let mut events = Vec::new();
    while let Ok(e) = rx.try_recv() {
        events.push(e);
    }
    assert!(matches!(events.first(), Some(ScanEvent::Started { symbols: 2, .. })));
    assert!(matches!(
        events.last(),
        Some(ScanEvent::Finished {
            signals: 2,
            cancelled: false,
            ..
        })
    ));
    let progress: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            ScanEvent::Progress(p) => Some(p),
            _ => None,
        })
        .collect();
    assert_eq!(progress.len(), 4);
    assert!(progress.iter().all(|p| p.total == 2 && p.eta.is_some()));
    assert_eq!(progress[1].eta, Some(Duration::ZERO));
    let failed = events
        .iter()
        .filter(|e| matches!(e, ScanEvent::FetchFailed(_)))
        .count();
    assert_eq!(failed, 2);
    let completed = events
        .iter()
        .filter(|e| matches!(e, ScanEvent::TimeframeCompleted(_)))
        .count();
    assert_eq!(completed, 2);
}

#[tokio::test]
async fn engine_selects_universe_and_keeps_it_when_listing_fails() {
    let mock = MockProvider::new();
    let mut spot_btc = swap("BTCUSDT");
    spot_btc.kind = MarketKind::Spot;
    mock.set_listing(Some(vec![
        swap("ETHUSDT"),
        swap("BTCUSDT"),
        swap("ETHUSDC"),
        spot_btc,
    ]));
    mock.reply("BTCUSDT", Reply::Candles(bullish_setup()));
    mock.reply("ETHUSDT", Reply::Candles(bearish_setup()));

    let mut engine = ScreenerEngine::new(Arc::new(mock.clone()), config(vec![Timeframe::H1]));
    let state = engine.run_manual().await;
    assert_eq!(
        symbols(&state.reports[0].current),
        vec!["BTCUSDT", "ETHUSDT"]
    );
    assert_eq!(engine.universe().len(), 2);

    mock.set_listing(None);
    let state = engine.run_manual().await;
    assert_eq!(state.cycles_completed, 2);
    assert_eq!(state.reports[0].signal_count(), 2);
    assert_eq!(engine.universe().len(), 2);
}

#[tokio::test]
async fn engine_ticks_only_in_auto_mode() {
    let mock = MockProvider::new();
    mock.set_listing(Some(vec![swap("BTCUSDT")]));
    mock.reply("BTCUSDT", Reply::Candles(bullish_setup()));
    let hour_boundary = 1_700_002_800;

    let mut manual = ScreenerEngine::new(Arc::new(mock.clone()), config(vec![Timeframe::H1]));
    assert!(manual.on_tick(hour_boundary + 5).await.is_none());

    let auto_cfg = ScanConfig {
        auto_run: true,
        ..config(vec![Timeframe::H1])
    };
    let mut auto = ScreenerEngine::new(Arc::new(mock.clone()), auto_cfg);
    assert!(auto.on_tick(hour_boundary + 5).await.is_some());
    assert!(auto.on_tick(hour_boundary + 20).await.is_none());
    assert!(auto.on_tick(hour_boundary + 600).await.is_none());
    assert_eq!(auto.state().cycles_completed, 1);
    assert!(auto.on_tick(hour_boundary + 3600 + 1).await.is_some());
    assert_eq!(auto.state().cycles_completed, 2);
}
