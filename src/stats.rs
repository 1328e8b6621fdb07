// 该文件是 Guanlan （观澜） 项目的一部分。
// src/stats.rs - 会话统计
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

use std::time::{Duration, Instant};

/// FPS 测量窗口长度
const FPS_WINDOW: Duration = Duration::from_millis(1000);

/// 统计快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
  /// 会话累计检测数
  pub total_detections: u64,
  /// 当前帧目标数
  pub active_objects: usize,
  /// 最近一个测量窗口的帧率
  pub fps: u32,
  /// 最近一次推理耗时（毫秒）
  pub last_latency_ms: u64,
}

/// 会话统计聚合器
///
/// 累计计数跨周期保留，直到显式 `clear` 或进程结束。
#[derive(Debug)]
pub struct SessionStats {
  total_detections: u64,
  active_objects: usize,
  fps: u32,
  last_latency: Duration,
  window_start: Instant,
  window_cycles: u32,
}

impl Default for SessionStats {
  fn default() -> Self {
    Self::new()
  }
}

impl SessionStats {
  /// 创建一个新的统计聚合器，FPS 窗口从当前时刻开始
  pub fn new() -> Self {
    Self::starting_at(Instant::now())
  }

  /// 以指定时刻作为 FPS 窗口起点创建（测试注入时钟用）
  pub fn starting_at(now: Instant) -> Self {
    Self {
      total_detections: 0,
      active_objects: 0,
      fps: 0,
      last_latency: Duration::ZERO,
      window_start: now,
      window_cycles: 0,
    }
  }

  /// 记录一个完整周期
  pub fn record_cycle(&mut self, detections: usize, latency: Duration) {
    self.record_cycle_at(detections, latency, Instant::now());
  }

  /// 以指定时刻记录一个完整周期
  ///
  /// 窗口内累计的周期数达到 1000 ms 后折算为整数帧率，
  /// 随后重置计数与窗口起点。
  pub fn record_cycle_at(&mut self, detections: usize, latency: Duration, now: Instant) {
    self.total_detections += detections as u64;
    self.active_objects = detections;
    self.last_latency = latency;
    self.window_cycles += 1;

    let elapsed = now.saturating_duration_since(self.window_start);
    if elapsed >= FPS_WINDOW {
      let elapsed_ms = elapsed.as_millis() as f64;
      self.fps = (self.window_cycles as f64 * 1000.0 / elapsed_ms).round() as u32;
      self.window_cycles = 0;
      self.window_start = now;
    }
  }

  /// 清零累计检测数与当前目标数
  ///
  /// 不触碰 fps 与测量窗口，也不停止循环或清除叠加层。
  pub fn clear(&mut self) {
    self.total_detections = 0;
    self.active_objects = 0;
  }

  /// 取当前快照
  pub fn snapshot(&self) -> StatsSnapshot {
    StatsSnapshot {
      total_detections: self.total_detections,
      active_objects: self.active_objects,
      fps: self.fps,
      last_latency_ms: self.last_latency.as_millis() as u64,
    }
  }
}
