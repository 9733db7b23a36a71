// vrecode-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for unit tests and when the "test-mocks" feature is enabled.

use super::*;
use crate::error::{CoreError, CoreResult};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Mock implementation of MediaProber returning canned reports per path.
#[derive(Clone, Default)]
pub struct MockProber {
    reports: Rc<RefCell<HashMap<PathBuf, ProbeReport>>>,
    calls: Rc<Cell<usize>>,
}

impl MockProber {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the report returned for `path`. Paths without a report fail to probe.
    pub fn expect_report(&self, path: &Path, report: ProbeReport) {
        self.reports.borrow_mut().insert(path.to_path_buf(), report);
    }

    pub fn probe_count(&self) -> usize {
        self.calls.get()
    }
}

impl MediaProber for MockProber {
    fn probe(&self, path: &Path) -> CoreResult<ProbeReport> {
        self.calls.set(self.calls.get() + 1);
        log::info!("MockProber::probe called for: {}", path.display());
        self.reports.borrow().get(path).cloned().ok_or_else(|| {
            CoreError::FfprobeParse(format!(
                "MockProber: no report for {}",
                path.display()
            ))
        })
    }
}

/// Everything the mock toolkit has been asked to do, in order.
#[derive(Debug, Default)]
pub struct MockCalls {
    /// Lifecycle events such as "open source", "push 3", "close sink".
    pub events: Vec<String>,
    pub decode_options: Vec<DecodeOptions>,
    pub encode_settings: Vec<EncodeSettings>,
    pub pushed: Vec<u64>,
    pub source_closes: usize,
    pub sink_closes: usize,
}

/// Behaviour knobs for [`MockToolkit`].
#[derive(Debug, Clone, Default)]
pub struct MockBehaviour {
    pub frame_count: u64,
    pub parameters: StreamParameters,
    pub fail_open_source: bool,
    pub fail_open_sink: bool,
    /// Fail the push of the frame with this index.
    pub fail_push_at: Option<u64>,
    /// Fail the pull of the frame with this index.
    pub fail_decode_at: Option<u64>,
    pub fail_source_close: bool,
    pub fail_sink_close: bool,
}

/// Mock implementation of MediaToolkit that records every call.
///
/// The sink creates its output file on open and appends frame bytes on push,
/// like a real muxer would.
#[derive(Clone, Default)]
pub struct MockToolkit {
    behaviour: Rc<RefCell<MockBehaviour>>,
    calls: Rc<RefCell<MockCalls>>,
}

impl MockToolkit {
    pub fn new(behaviour: MockBehaviour) -> Self {
        Self {
            behaviour: Rc::new(RefCell::new(behaviour)),
            calls: Rc::default(),
        }
    }

    /// A toolkit whose source yields `frame_count` frames of `width`x`height`.
    pub fn with_frames(frame_count: u64, width: u32, height: u32) -> Self {
        Self::new(MockBehaviour {
            frame_count,
            parameters: StreamParameters {
                width,
                height,
                frame_rate: 25.0,
                ..Default::default()
            },
            ..Default::default()
        })
    }

    pub fn behaviour_mut(&self) -> std::cell::RefMut<'_, MockBehaviour> {
        self.behaviour.borrow_mut()
    }

    pub fn calls(&self) -> std::cell::Ref<'_, MockCalls> {
        self.calls.borrow()
    }

    fn record(&self, event: impl Into<String>) {
        self.calls.borrow_mut().events.push(event.into());
    }
}

impl MediaToolkit for MockToolkit {
    type Source = MockDecodeSource;
    type Sink = MockEncodeSink;

    fn open_source(&self, input: &Path, options: &DecodeOptions) -> CoreResult<Self::Source> {
        self.calls.borrow_mut().decode_options.push(options.clone());
        let behaviour = self.behaviour.borrow().clone();
        if behaviour.fail_open_source {
            self.record("open source failed");
            return Err(CoreError::DecodeOpen(
                input.display().to_string(),
                "mock open failure".to_string(),
            ));
        }
        self.record("open source");
        Ok(MockDecodeSource {
            toolkit: self.clone(),
            behaviour,
            next_index: 0,
        })
    }

    fn open_sink(&self, output: &Path, settings: &EncodeSettings) -> CoreResult<Self::Sink> {
        self.calls.borrow_mut().encode_settings.push(settings.clone());
        let behaviour = self.behaviour.borrow().clone();
        if behaviour.fail_open_sink {
            self.record("open sink failed");
            return Err(CoreError::EncodeOpen(
                output.display().to_string(),
                "mock open failure".to_string(),
            ));
        }
        File::create(output)?;
        self.record("open sink");
        Ok(MockEncodeSink {
            toolkit: self.clone(),
            behaviour,
            output: output.to_path_buf(),
        })
    }
}

/// Decode source handed out by [`MockToolkit`].
pub struct MockDecodeSource {
    toolkit: MockToolkit,
    behaviour: MockBehaviour,
    next_index: u64,
}

impl DecodeSource for MockDecodeSource {
    fn parameters(&self) -> &StreamParameters {
        &self.behaviour.parameters
    }

    fn next_frame(&mut self) -> CoreResult<Option<Frame>> {
        if self.next_index >= self.behaviour.frame_count {
            return Ok(None);
        }
        let index = self.next_index;
        if self.behaviour.fail_decode_at == Some(index) {
            self.toolkit.record(format!("decode {index} failed"));
            return Err(CoreError::Decode(format!("mock decode failure at frame {index}")));
        }
        self.next_index += 1;
        Ok(Some(Frame {
            index,
            width: self.behaviour.parameters.width,
            height: self.behaviour.parameters.height,
            timestamp: index as f32 / 25.0,
            data: vec![(index % 256) as u8; 4],
        }))
    }

    fn close(&mut self) -> CoreResult<()> {
        self.toolkit.calls.borrow_mut().source_closes += 1;
        self.toolkit.record("close source");
        if self.behaviour.fail_source_close {
            return Err(CoreError::Decode("mock source close failure".to_string()));
        }
        Ok(())
    }
}

/// Encode sink handed out by [`MockToolkit`].
pub struct MockEncodeSink {
    toolkit: MockToolkit,
    behaviour: MockBehaviour,
    output: PathBuf,
}

impl EncodeSink for MockEncodeSink {
    fn push(&mut self, frame: Frame) -> CoreResult<()> {
        if self.behaviour.fail_push_at == Some(frame.index) {
            self.toolkit.record(format!("push {} failed", frame.index));
            return Err(CoreError::Encode(format!(
                "mock encode failure at frame {}",
                frame.index
            )));
        }
        let mut file = OpenOptions::new().append(true).open(&self.output)?;
        file.write_all(&frame.data)?;
        self.toolkit.calls.borrow_mut().pushed.push(frame.index);
        self.toolkit.record(format!("push {}", frame.index));
        Ok(())
    }

    fn close(&mut self) -> CoreResult<()> {
        self.toolkit.calls.borrow_mut().sink_closes += 1;
        self.toolkit.record("close sink");
        if self.behaviour.fail_sink_close {
            return Err(CoreError::Encode("mock sink close failure".to_string()));
        }
        Ok(())
    }
}
