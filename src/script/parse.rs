use crate::foundation::core::{Fps, Size};
use crate::foundation::error::{BootAnimError, BootAnimResult};
use crate::script::MAX_PATH_LEN;

/// How many times a segment plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Repeat {
    /// Plays until playback is cancelled (`count` of 0 in the script).
    Infinite,
    /// Plays exactly this many passes.
    Times(u32),
}

impl Repeat {
    /// Map the script's count, where 0 means forever.
    pub fn from_count(count: u32) -> Self {
        if count == 0 {
            Self::Infinite
        } else {
            Self::Times(count)
        }
    }

    /// Count as written in the script.
    pub fn count(self) -> u32 {
        match self {
            Self::Infinite => 0,
            Self::Times(n) => n,
        }
    }

    /// Whether pass `pass` (1-based) is the final one.
    pub fn is_last_pass(self, pass: u32) -> bool {
        matches!(self, Self::Times(n) if pass >= n)
    }

    /// Whether another pass may start after `completed` passes.
    pub fn allows_pass(self, completed: u32) -> bool {
        match self {
            Self::Infinite => true,
            Self::Times(n) => completed < n,
        }
    }
}

/// One `p` line of the script, before its frames are resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentSpec {
    /// Repeat budget.
    pub repeat: Repeat,
    /// Frame intervals to wait after each pass.
    pub pause_frames: u32,
    /// Archive directory holding the frames.
    pub path_prefix: String,
}

/// Parsed script before archive resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Script {
    /// Canvas size from the header, or the defaults.
    pub size: Size,
    /// Frame rate from the header, or the default.
    pub fps: Fps,
    /// Whether a header line was present.
    pub has_header: bool,
    /// Segments in file order.
    pub segments: Vec<SegmentSpec>,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ScriptLine<'a> {
    Header { width: i32, height: i32, fps: i32 },
    Segment { count: i32, pause: i32, path: &'a str },
    Other,
}

pub(crate) fn classify_line(line: &str) -> ScriptLine<'_> {
    if let Some(rest) = line.strip_prefix('p') {
        let mut tok = rest.split_whitespace();
        if let (Some(count), Some(pause), Some(path)) = (tok.next(), tok.next(), tok.next())
            && let (Ok(count), Ok(pause)) = (count.parse::<i32>(), pause.parse::<i32>())
        {
            return ScriptLine::Segment { count, pause, path };
        }
        return ScriptLine::Other;
    }

    let mut tok = line.split_whitespace().map(str::parse::<i32>);
    match (tok.next(), tok.next(), tok.next()) {
        (Some(Ok(width)), Some(Ok(height)), Some(Ok(fps))) => {
            ScriptLine::Header { width, height, fps }
        }
        _ => ScriptLine::Other,
    }
}

/// Parse script text.
///
/// The first three-integer line seen before any segment line sets the canvas and frame rate; its
/// values must be positive. Segment lines are appended in file order. Anything else, including
/// segment lines with negative numbers or over-long paths, is skipped.
pub fn parse_script(text: &str, default_size: Size, default_fps: Fps) -> BootAnimResult<Script> {
    let mut script = Script {
        size: default_size,
        fps: default_fps,
        has_header: false,
        segments: Vec::new(),
    };

    for (lineno, raw) in text.split('\n').enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        match classify_line(line) {
            ScriptLine::Header { width, height, fps }
                if !script.has_header && script.segments.is_empty() =>
            {
                let (Ok(w), Ok(h), Ok(f)) = (
                    u32::try_from(width),
                    u32::try_from(height),
                    u32::try_from(fps),
                ) else {
                    return Err(BootAnimError::script(format!(
                        "malformed header on line {}: '{line}'",
                        lineno + 1
                    )));
                };
                if w == 0 || h == 0 {
                    return Err(BootAnimError::script(format!(
                        "malformed header on line {}: zero-sized canvas",
                        lineno + 1
                    )));
                }
                script.fps = Fps::new(f).map_err(|_| {
                    BootAnimError::script(format!(
                        "malformed header on line {}: fps must be > 0",
                        lineno + 1
                    ))
                })?;
                script.size = Size::new(w, h);
                script.has_header = true;
            }
            ScriptLine::Segment { count, pause, path } => {
                let (Ok(count), Ok(pause)) = (u32::try_from(count), u32::try_from(pause)) else {
                    tracing::debug!(line = lineno + 1, "skipping segment with negative count");
                    continue;
                };
                if path.len() > MAX_PATH_LEN {
                    tracing::debug!(line = lineno + 1, "skipping segment with over-long path");
                    continue;
                }
                script.segments.push(SegmentSpec {
                    repeat: Repeat::from_count(count),
                    pause_frames: pause,
                    path_prefix: path.to_string(),
                });
            }
            ScriptLine::Header { .. } | ScriptLine::Other => {}
        }
    }

    Ok(script)
}

#[cfg(test)]
#[path = "../../tests/unit/script/parse.rs"]
mod tests;
