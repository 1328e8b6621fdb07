// 该文件是 Guanlan （观澜） 项目的一部分。
// tests/session.rs - 检测循环集成测试
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::sync::{Arc, Mutex};
use std::time::Duration;

use guanlan::input::{Frame, FrameSource, SyntheticSource};
use guanlan::model::{EngineError, InferenceEngine, RawPrediction, StubEngine};
use guanlan::output::Visualizer;
use guanlan::session::{
  CycleOutcome, CycleScheduler, DetectionSession, SessionError, SessionState, StopHandle,
};
use guanlan::settings::{Settings, SharedSettings};
use guanlan::vocab::ClassVocabulary;

fn prediction(class: &str, score: f32) -> RawPrediction {
  RawPrediction {
    class: class.into(),
    score,
    bbox: [10.0, 10.0, 20.0, 15.0],
  }
}

fn session_with(
  engine: StubEngine,
  settings: Settings,
) -> DetectionSession<SyntheticSource, StubEngine> {
  DetectionSession::new(
    SyntheticSource::new(64, 48),
    engine,
    ClassVocabulary::coco(),
    SharedSettings::new(settings),
    Visualizer::new(),
  )
}

#[test]
fn start_fails_when_engine_not_ready() {
  let mut engine = StubEngine::unavailable();
  assert!(matches!(
    engine.load(Duration::from_millis(50)),
    Err(EngineError::ModelUnavailable(_))
  ));

  let mut session = session_with(engine, Settings::default());
  assert!(matches!(session.start(), Err(SessionError::NotReady)));
  assert_eq!(session.state(), SessionState::Idle);
  assert_eq!(session.cycles_completed(), 0);
  // 空闲状态下节拍不执行周期
  assert!(matches!(session.tick(), Ok(CycleOutcome::Idle)));
}

#[test]
fn start_fails_when_source_not_ready() {
  let mut session = DetectionSession::new(
    SyntheticSource::new(0, 0),
    StubEngine::scripted(vec![]),
    ClassVocabulary::coco(),
    SharedSettings::new(Settings::default()),
    Visualizer::new(),
  );

  assert!(matches!(session.start(), Err(SessionError::NotReady)));
  assert_eq!(session.cycles_completed(), 0);
}

#[test]
fn second_start_is_rejected_without_consuming_cycles() {
  let engine = StubEngine::scripted(vec![
    Ok(vec![prediction("person", 0.9)]),
    Ok(vec![prediction("car", 0.9), prediction("dog", 0.8)]),
  ]);
  let mut session = session_with(engine, Settings::default());

  session.start().unwrap();
  assert!(matches!(session.start(), Err(SessionError::AlreadyRunning)));
  assert_eq!(session.state(), SessionState::Running);

  // 重复启动没有消耗脚本周期：第一次节拍仍得到第一个脚本条目
  session.tick().unwrap();
  assert_eq!(session.stats().total_detections, 1);
  assert_eq!(session.detections()[0].label, "person");
}

#[test]
fn cycle_filters_caps_and_broadcasts() {
  let engine = StubEngine::scripted(vec![Ok(vec![
    prediction("person", 0.9),
    prediction("car", 0.3),
    prediction("dog", 0.7),
  ])]);
  let settings = Settings {
    confidence_threshold: 0.5,
    show_confidence_label: true,
    max_detections: 2,
  };
  let mut session = session_with(engine, settings);

  session.start().unwrap();
  assert_eq!(session.tick().unwrap(), CycleOutcome::Completed);

  // 过滤：0.3 被丢弃；截断到 2 个；保持引擎原始顺序
  let detections = session.detections();
  assert_eq!(detections.len(), 2);
  assert_eq!(detections[0].label, "person");
  assert_eq!(detections[1].label, "dog");

  // 统计、计数与叠加层已同步更新
  let stats = session.stats();
  assert_eq!(stats.total_detections, 2);
  assert_eq!(stats.active_objects, 2);
  assert_eq!(session.tally().count("person"), Some(1));
  assert_eq!(session.tally().count("dog"), Some(1));
  assert_eq!(session.tally().count("car"), Some(0));
  assert_eq!(
    session.overlay().map(|overlay| overlay.dimensions()),
    Some((64, 48))
  );
}

#[test]
fn unknown_labels_are_rendered_but_not_tallied() {
  let engine = StubEngine::scripted(vec![Ok(vec![
    prediction("cat", 0.9),
    prediction("cat", 0.8),
    prediction("unicorn", 0.95),
  ])]);
  let mut session = session_with(engine, Settings::default());

  session.start().unwrap();
  session.tick().unwrap();

  // 检测集（与渲染）保留词表外的类别，计数器忽略它
  assert_eq!(session.detections().len(), 3);
  assert_eq!(session.tally().count("cat"), Some(2));
  assert_eq!(session.tally().count("unicorn"), None);
}

#[test]
fn detect_failure_halts_without_partial_update() {
  let engine = StubEngine::scripted(vec![
    Ok(vec![prediction("person", 0.9)]),
    Err(EngineError::Detection("坏帧".into())),
  ]);
  let mut session = session_with(engine, Settings::default());

  session.start().unwrap();
  session.tick().unwrap();
  let before = session.stats();

  assert!(matches!(
    session.tick(),
    Err(SessionError::Detection(EngineError::Detection(_)))
  ));
  assert_eq!(session.state(), SessionState::Idle);

  // 失败的周期没有留下任何部分更新，也不会自动重试
  assert_eq!(session.stats(), before);
  assert_eq!(session.cycles_completed(), 1);
  assert!(matches!(session.tick(), Ok(CycleOutcome::Idle)));
}

#[test]
fn clear_resets_counters_without_stopping() {
  let engine = StubEngine::scripted(vec![
    Ok(vec![prediction("person", 0.9)]),
    Ok(vec![prediction("car", 0.9)]),
    Ok(vec![prediction("dog", 0.9)]),
  ]);
  let mut session = session_with(engine, Settings::default());

  session.start().unwrap();
  session.tick().unwrap();
  session.tick().unwrap();
  assert_eq!(session.stats().total_detections, 2);

  session.clear();
  let stats = session.stats();
  assert_eq!(stats.total_detections, 0);
  assert_eq!(stats.active_objects, 0);
  assert_eq!(session.state(), SessionState::Running);

  // 清零后循环照常继续
  session.tick().unwrap();
  assert_eq!(session.stats().total_detections, 1);
}

#[test]
fn settings_changes_apply_from_the_next_cycle() {
  let engine = StubEngine::scripted(vec![
    Ok(vec![prediction("person", 0.6)]),
    Ok(vec![prediction("person", 0.6)]),
  ]);
  let mut session = session_with(engine, Settings::default());

  session.start().unwrap();
  session.tick().unwrap();
  assert_eq!(session.detections().len(), 1);

  // 周期之间修改阈值，下一个周期以新快照过滤
  session.settings().set_confidence_threshold(0.8).unwrap();
  session.tick().unwrap();
  assert!(session.detections().is_empty());
  assert_eq!(session.stats().active_objects, 0);
}

/// 在推理调用内部触发停止请求的引擎，模拟推理在途时到达的 stop()
struct StoppingEngine {
  handle: Arc<Mutex<Option<StopHandle>>>,
}

impl InferenceEngine for StoppingEngine {
  fn load(&mut self, _timeout: Duration) -> Result<(), EngineError> {
    Ok(())
  }

  fn is_ready(&self) -> bool {
    true
  }

  fn detect(&mut self, _frame: &Frame) -> Result<Vec<RawPrediction>, EngineError> {
    if let Some(handle) = self.handle.lock().unwrap().as_ref() {
      handle.stop();
    }
    Ok(vec![prediction("person", 0.9)])
  }
}

#[test]
fn stop_during_inference_discards_result() {
  let slot = Arc::new(Mutex::new(None));
  let mut session = DetectionSession::new(
    SyntheticSource::new(64, 48),
    StoppingEngine {
      handle: slot.clone(),
    },
    ClassVocabulary::coco(),
    SharedSettings::new(Settings::default()),
    Visualizer::new(),
  );
  *slot.lock().unwrap() = Some(session.stop_handle());

  session.start().unwrap();
  assert_eq!(session.tick().unwrap(), CycleOutcome::Stopped);

  // 在途结果作废：统计、计数、叠加层均未被触碰
  assert_eq!(session.state(), SessionState::Idle);
  assert_eq!(session.stats().total_detections, 0);
  assert!(session.detections().is_empty());
  assert!(session.overlay().is_none());
  assert_eq!(session.cycles_completed(), 0);
}

#[test]
fn stop_handle_takes_effect_before_next_cycle() {
  let engine = StubEngine::scripted(vec![Ok(vec![prediction("person", 0.9)])]);
  let mut session = session_with(engine, Settings::default());

  session.start().unwrap();
  session.stop_handle().stop();

  assert_eq!(session.tick().unwrap(), CycleOutcome::Stopped);
  assert_eq!(session.state(), SessionState::Idle);
  assert_eq!(session.cycles_completed(), 0);
}

/// 限定节拍数的调度器（测试替身）
struct CountedScheduler {
  remaining: u32,
}

impl CycleScheduler for CountedScheduler {
  fn next_tick(&mut self) -> bool {
    if self.remaining == 0 {
      return false;
    }
    self.remaining -= 1;
    true
  }
}

#[test]
fn scheduler_drives_full_cycles() {
  let mut engine = StubEngine::synthetic();
  engine.load(Duration::from_millis(100)).unwrap();
  let mut session = session_with(engine, Settings::default());

  session.start().unwrap();
  let mut scheduler = CountedScheduler { remaining: 3 };
  while scheduler.next_tick() {
    assert_eq!(session.tick().unwrap(), CycleOutcome::Completed);
  }
  session.stop();

  assert_eq!(session.cycles_completed(), 3);
  assert_eq!(session.state(), SessionState::Idle);
  assert!(session.overlay().is_some());

  // 停止后会话可以重新启动
  session.start().unwrap();
  assert_eq!(session.tick().unwrap(), CycleOutcome::Completed);
  assert_eq!(session.cycles_completed(), 4);
}
