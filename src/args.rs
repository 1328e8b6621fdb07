// 该文件是 Guanlan （观澜） 项目的一部分。
// src/args.rs - 项目参数配置
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

use std::path::PathBuf;

use clap::Parser;

/// Guanlan 实时检测叠加演示参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 帧宽度
  #[arg(long, default_value = "640", value_name = "WIDTH")]
  pub width: u32,

  /// 帧高度
  #[arg(long, default_value = "480", value_name = "HEIGHT")]
  pub height: u32,

  /// 周期节拍间隔（毫秒，显示刷新时钟的替身）
  #[arg(long, default_value = "33", value_name = "MS")]
  pub tick_ms: u64,

  /// 处理周期数（0 表示无限制）
  #[arg(long, default_value = "0", value_name = "COUNT")]
  pub frames: u64,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.5", value_name = "THRESHOLD")]
  pub confidence: f32,

  /// 每帧最大检测数
  #[arg(long, default_value = "20", value_name = "COUNT")]
  pub max_detections: usize,

  /// 标签不附带置信度
  #[arg(long)]
  pub no_score_label: bool,

  /// 标签字体文件路径（缺省时仅绘制标签底色）
  #[arg(long, value_name = "FILE")]
  pub font: Option<PathBuf>,

  /// 标注帧记录目录（缺省时不记录）
  #[arg(long, value_name = "DIR")]
  pub record: Option<PathBuf>,

  /// 记录所有帧（包括无检测的帧）
  #[arg(long)]
  pub record_always: bool,

  /// 模型加载超时（毫秒）
  #[arg(long, default_value = "5000", value_name = "MS")]
  pub load_timeout_ms: u64,
}
