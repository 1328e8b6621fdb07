// 该文件是 Guanlan （观澜） 项目的一部分。
// src/session.rs - 检测循环控制
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

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use image::RgbImage;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::detector::{Detection, filter_predictions};
use crate::input::FrameSource;
use crate::model::{EngineError, InferenceEngine};
use crate::output::Visualizer;
use crate::settings::SharedSettings;
use crate::stats::{SessionStats, StatsSnapshot};
use crate::tally::ClassTally;
use crate::vocab::ClassVocabulary;

#[derive(Error, Debug)]
pub enum SessionError {
  #[error("帧来源或推理引擎尚未就绪")]
  NotReady,
  #[error("会话已在运行中")]
  AlreadyRunning,
  #[error("推理失败: {0}")]
  Detection(#[from] EngineError),
}

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
  Idle,
  Running,
}

/// 单次节拍的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
  /// 周期完整执行：过滤、统计、计数、渲染均已更新
  Completed,
  /// 会话空闲，本节拍未执行任何周期
  Idle,
  /// 停止请求生效，在途的推理结果被丢弃
  Stopped,
}

/// 停止句柄，可从其他线程（如 ctrl-c 处理器）请求停止
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
  /// 请求停止；在下一次状态检查点生效
  pub fn stop(&self) {
    self.0.store(true, Ordering::SeqCst);
  }
}

/// 周期调度器：决定下一个周期何时开始
///
/// 循环逻辑与具体调度原语解耦：生产环境注入固定节拍
/// （显示刷新时钟的替身），测试则直接驱动 `tick`。
pub trait CycleScheduler {
  /// 阻塞等待下一个节拍；返回 false 表示调度结束
  fn next_tick(&mut self) -> bool;
}

/// 固定节拍调度器
///
/// 下一个节拍在当前周期完成后才会排队，推理慢于节拍时自动降速。
pub struct FixedRateScheduler {
  interval: Duration,
  next: Option<Instant>,
}

impl FixedRateScheduler {
  pub fn new(interval: Duration) -> Self {
    Self {
      interval,
      next: None,
    }
  }
}

impl CycleScheduler for FixedRateScheduler {
  fn next_tick(&mut self) -> bool {
    let now = Instant::now();
    if let Some(next) = self.next {
      if next > now {
        std::thread::sleep(next - now);
      }
    }
    self.next = Some(Instant::now() + self.interval);
    true
  }
}

/// 检测循环控制器
///
/// 持有会话的全部状态：帧来源、推理引擎、设置、统计、计数与叠加层。
/// 单个协作线程驱动 `tick`，周期内唯一的阻塞点是推理调用；
/// 每个会话同一时刻至多一个在途的推理调用。
pub struct DetectionSession<S, E> {
  source: S,
  engine: E,
  settings: SharedSettings,
  visualizer: Visualizer,
  stats: SessionStats,
  tally: ClassTally,
  state: SessionState,
  stop_requested: Arc<AtomicBool>,
  detections: Vec<Detection>,
  overlay: Option<RgbImage>,
  cycles_completed: u64,
}

impl<S: FrameSource, E: InferenceEngine> DetectionSession<S, E> {
  /// 组装一个新的检测会话，初始状态为空闲
  pub fn new(
    source: S,
    engine: E,
    vocabulary: ClassVocabulary,
    settings: SharedSettings,
    visualizer: Visualizer,
  ) -> Self {
    Self {
      source,
      engine,
      settings,
      visualizer,
      stats: SessionStats::new(),
      tally: ClassTally::new(vocabulary),
      state: SessionState::Idle,
      stop_requested: Arc::new(AtomicBool::new(false)),
      detections: Vec::new(),
      overlay: None,
      cycles_completed: 0,
    }
  }

  /// 当前会话状态
  pub fn state(&self) -> SessionState {
    self.state
  }

  /// 共享设置句柄
  pub fn settings(&self) -> SharedSettings {
    self.settings.clone()
  }

  /// 停止句柄
  pub fn stop_handle(&self) -> StopHandle {
    StopHandle(self.stop_requested.clone())
  }

  /// 统计快照
  pub fn stats(&self) -> StatsSnapshot {
    self.stats.snapshot()
  }

  /// 当前周期的类别计数
  pub fn tally(&self) -> &ClassTally {
    &self.tally
  }

  /// 当前周期的检测集
  pub fn detections(&self) -> &[Detection] {
    &self.detections
  }

  /// 最近一次渲染的叠加帧
  pub fn overlay(&self) -> Option<&RgbImage> {
    self.overlay.as_ref()
  }

  /// 已完成的周期数
  pub fn cycles_completed(&self) -> u64 {
    self.cycles_completed
  }

  /// 启动会话
  ///
  /// 要求帧来源与推理引擎均已就绪，否则返回 `NotReady` 且不执行
  /// 任何周期。会话已在运行时拒绝并保持原状。
  pub fn start(&mut self) -> Result<(), SessionError> {
    if self.state == SessionState::Running {
      warn!("忽略重复的启动请求：会话已在运行中");
      return Err(SessionError::AlreadyRunning);
    }
    if !self.source.is_ready() || !self.engine.is_ready() {
      return Err(SessionError::NotReady);
    }

    self.stop_requested.store(false, Ordering::SeqCst);
    self.state = SessionState::Running;
    let (width, height) = self.source.dimensions();
    info!("检测会话启动，帧尺寸 {}x{}", width, height);
    Ok(())
  }

  /// 停止会话，在下一个节拍前生效
  pub fn stop(&mut self) {
    if self.state == SessionState::Running {
      info!("检测会话停止");
    }
    self.state = SessionState::Idle;
  }

  /// 清零累计统计
  ///
  /// 不停止循环，不触碰 fps，也不清除叠加层。
  pub fn clear(&mut self) {
    self.stats.clear();
  }

  /// 执行一个检测周期
  ///
  /// 取当前帧 -> 推理 -> 过滤 -> 统计 -> 计数 -> 渲染，依次进行。
  /// 周期是原子的：推理失败时会话转入空闲且不留下任何部分更新；
  /// 推理期间到达的停止请求使结果作废，同样不触碰共享状态。
  pub fn tick(&mut self) -> Result<CycleOutcome, SessionError> {
    if self.state != SessionState::Running {
      return Ok(CycleOutcome::Idle);
    }
    if self.stop_requested.swap(false, Ordering::SeqCst) {
      self.stop();
      return Ok(CycleOutcome::Stopped);
    }

    // 设置在周期开始处取单次快照，周期中途的修改不会生效
    let settings = self.settings.snapshot();
    let frame = self.source.current_frame();

    let started = Instant::now();
    let raw = match self.engine.detect(&frame) {
      Ok(raw) => raw,
      Err(error) => {
        self.state = SessionState::Idle;
        warn!("推理失败，会话转入空闲: {error}");
        return Err(SessionError::Detection(error));
      }
    };
    let latency = started.elapsed();

    // 推理期间到达的停止请求：在途结果作废
    if self.stop_requested.swap(false, Ordering::SeqCst) {
      self.stop();
      debug!("丢弃在途的推理结果（{} 条原始预测）", raw.len());
      return Ok(CycleOutcome::Stopped);
    }

    let detections = filter_predictions(raw, settings.confidence_threshold, settings.max_detections);
    self.stats.record_cycle(detections.len(), latency);
    self.tally.rebuild(&detections);
    self.overlay = Some(
      self
        .visualizer
        .render(&frame.image, &detections, settings.show_confidence_label),
    );
    self.detections = detections;
    self.cycles_completed += 1;

    debug!(
      "周期 {} 完成: {} 个目标, 推理耗时 {:.2?}",
      self.cycles_completed,
      self.detections.len(),
      latency
    );
    Ok(CycleOutcome::Completed)
  }
}
