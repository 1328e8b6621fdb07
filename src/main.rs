// 该文件是 Guanlan （观澜） 项目的一部分。
// src/main.rs - 实时检测叠加演示程序
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

mod args;

use std::time::Duration;

use ab_glyph::FontArc;
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};

use guanlan::input::SyntheticSource;
use guanlan::model::{InferenceEngine, StubEngine};
use guanlan::output::{SnapshotRecorder, Visualizer, label_text};
use guanlan::session::{
  CycleOutcome, CycleScheduler, DetectionSession, FixedRateScheduler, SessionState,
};
use guanlan::settings::{Settings, SharedSettings};
use guanlan::vocab::ClassVocabulary;

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("帧尺寸: {}x{}", args.width, args.height);
  info!("节拍间隔: {} ms", args.tick_ms);
  info!("置信度阈值: {}", args.confidence);
  info!("每帧最大检测数: {}", args.max_detections);

  let settings = SharedSettings::new(Settings::default());
  settings.set_confidence_threshold(args.confidence)?;
  settings.set_max_detections(args.max_detections)?;
  settings.set_show_confidence_label(!args.no_score_label);

  let mut visualizer = Visualizer::new();
  match &args.font {
    Some(path) => {
      let bytes =
        std::fs::read(path).with_context(|| format!("无法读取字体文件: {}", path.display()))?;
      let font = FontArc::try_from_vec(bytes)
        .map_err(|error| anyhow::anyhow!("无法解析字体文件: {error}"))?;
      visualizer = visualizer.with_font(font);
    }
    None => info!("未指定字体，标签仅绘制底色"),
  }

  let source = SyntheticSource::new(args.width, args.height);
  let mut engine = StubEngine::synthetic();
  info!("正在加载模型...");
  engine.load(Duration::from_millis(args.load_timeout_ms))?;
  info!("模型加载完成");

  let mut session = DetectionSession::new(
    source,
    engine,
    ClassVocabulary::coco(),
    settings,
    visualizer,
  );

  let handle = session.stop_handle();
  ctrlc::set_handler(move || {
    info!("收到中断信号，准备退出...");
    handle.stop();
  })
  .context("无法设置中断处理器")?;

  let mut recorder = args
    .record
    .as_ref()
    .map(|dir| SnapshotRecorder::new(dir).always(args.record_always));

  session.start()?;
  let mut scheduler = FixedRateScheduler::new(Duration::from_millis(args.tick_ms));

  while session.state() == SessionState::Running {
    if args.frames > 0 && session.cycles_completed() >= args.frames {
      info!("达到指定周期数 {}, 退出", args.frames);
      break;
    }
    if !scheduler.next_tick() {
      break;
    }

    match session.tick()? {
      CycleOutcome::Completed => {
        let stats = session.stats();
        info!(
          "周期 {}: {} 个目标, 推理延迟 {} ms, fps {}",
          session.cycles_completed(),
          stats.active_objects,
          stats.last_latency_ms,
          stats.fps
        );
        for detection in session.detections() {
          debug!("  - {}", label_text(detection, true));
        }

        if let Some(recorder) = recorder.as_mut() {
          if let Some(overlay) = session.overlay() {
            recorder.save(overlay, session.detections(), &stats)?;
          }
        }
      }
      CycleOutcome::Stopped => {
        warn!("停止请求生效，在途结果已丢弃");
        break;
      }
      CycleOutcome::Idle => break,
    }
  }
  session.stop();

  let stats = session.stats();
  info!("处理完成");
  info!("总周期数: {}", session.cycles_completed());
  info!("总检测数: {}", stats.total_detections);
  for (label, count) in session.tally().iter().filter(|(_, count)| *count > 0) {
    info!("  最后一帧 {}: {}", label, count);
  }

  println!(
    "{}",
    serde_json::json!({
      "cycles": session.cycles_completed(),
      "total_detections": stats.total_detections,
      "fps": stats.fps,
      "last_latency_ms": stats.last_latency_ms,
    })
  );

  Ok(())
}
