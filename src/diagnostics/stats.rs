use serde::Serialize;
use std::time::Instant;

use crate::sensor::types::FrameChannel;

/// Per-channel counters for a viewer session.
struct ChannelStats {
    frame_count: u64,
    skip_count: u64,
}

/// Collects diagnostic statistics for a viewer session.
///
/// A "skip" is a benign not-ready cycle where the sensor delivered no
/// new frame and the surfaces were left untouched.
pub struct SessionStats {
    color: ChannelStats,
    depth: ChannelStats,
    start_time: Instant,
}

/// Snapshot of session stats for IPC serialisation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub color_frame_count: u64,
    pub color_skip_count: u64,
    pub color_fps: f64,
    pub depth_frame_count: u64,
    pub depth_skip_count: u64,
    pub depth_fps: f64,
    pub uptime_secs: f64,
}

impl SessionStats {
    /// Create new stats with zeroed counters.
    pub fn new() -> Self {
        Self {
            color: ChannelStats {
                frame_count: 0,
                skip_count: 0,
            },
            depth: ChannelStats {
                frame_count: 0,
                skip_count: 0,
            },
            start_time: Instant::now(),
        }
    }

    fn channel(&self, channel: FrameChannel) -> &ChannelStats {
        match channel {
            FrameChannel::Color => &self.color,
            FrameChannel::Depth => &self.depth,
        }
    }

    fn channel_mut(&mut self, channel: FrameChannel) -> &mut ChannelStats {
        match channel {
            FrameChannel::Color => &mut self.color,
            FrameChannel::Depth => &mut self.depth,
        }
    }

    /// Record a delivered frame on a channel.
    pub fn record_frame(&mut self, channel: FrameChannel) {
        self.channel_mut(channel).frame_count += 1;
    }

    /// Record a not-ready cycle on a channel.
    pub fn record_skip(&mut self, channel: FrameChannel) {
        self.channel_mut(channel).skip_count += 1;
    }

    pub fn frame_count(&self, channel: FrameChannel) -> u64 {
        self.channel(channel).frame_count
    }

    pub fn skip_count(&self, channel: FrameChannel) -> u64 {
        self.channel(channel).skip_count
    }

    /// Delivered frames per second on a channel since session start.
    pub fn fps(&self, channel: FrameChannel) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            return 0.0;
        }
        self.channel(channel).frame_count as f64 / elapsed
    }

    /// Take a serialisable snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            color_frame_count: self.color.frame_count,
            color_skip_count: self.color.skip_count,
            color_fps: self.fps(FrameChannel::Color),
            depth_frame_count: self.depth.frame_count,
            depth_skip_count: self.depth.skip_count,
            depth_fps: self.fps(FrameChannel::Depth),
            uptime_secs: self.start_time.elapsed().as_secs_f64(),
        }
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}
