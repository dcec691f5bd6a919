//! C FFI bindings for host applications.
//!
//! Exposes the touch analysis session to mobile platforms via C ABI. The host
//! forwards each touch event with `touch_session_submit()` and reads the
//! profile when the session finishes.
//!
//! Memory Safety:
//! - All returned strings must be freed with `touch_free_string()`
//! - The session instance must be freed with `touch_session_destroy()`
//! - NULL checks are performed on all inputs
//!
//! Thread Safety:
//! - The session is NOT thread-safe. Use a single thread or mutex.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::AnalyzerConfig;
use crate::pipeline::TouchAnalysisPipeline;
use crate::pressure::{PressureMode, DEFAULT_MAX_CONTACT_AREA, DEFAULT_MIN_CONTACT_AREA};
use crate::types::{EdgeFlags, ElderlyTouchProfile, ToolType, TouchAction, TouchSample};

// ============================================================================
// OPAQUE HANDLE TYPES
// ============================================================================

/// Opaque handle to a touch analysis session.
pub struct TouchSession {
    pipeline: TouchAnalysisPipeline,
}

/// Result status codes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchStatus {
    /// Operation succeeded.
    Ok = 0,
    /// Null pointer provided.
    NullPointer = 1,
    /// Invalid parameter value.
    InvalidParameter = 2,
}

/// Flat view of an elderly-likelihood profile.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchProfileOutput {
    /// 1 if the profile indicates an elderly user, else 0.
    pub is_likely_elderly: i32,
    /// Confidence [0.0, 1.0].
    pub confidence: f32,
    /// Average touch speed in px/s.
    pub avg_speed: f32,
    /// Average tap duration in milliseconds.
    pub avg_tap_duration_ms: u64,
    pub avg_touch_size: f32,
    pub tremor: f32,
    /// Path efficiency [0.0, 1.0].
    pub path_efficiency: f32,
    pub pressure_variance: f32,
    /// Number of patterns the profile was derived from.
    pub pattern_count: u32,
    /// Number of recommendations (text via `touch_session_report()`).
    pub recommendation_count: u32,
}

impl From<&ElderlyTouchProfile> for TouchProfileOutput {
    fn from(profile: &ElderlyTouchProfile) -> Self {
        let c = &profile.characteristics;
        Self {
            is_likely_elderly: profile.is_likely_elderly as i32,
            confidence: profile.confidence,
            avg_speed: c.avg_speed,
            avg_tap_duration_ms: c.avg_tap_duration_ms,
            avg_touch_size: c.avg_touch_size,
            tremor: c.tremor,
            path_efficiency: c.path_efficiency,
            pressure_variance: c.pressure_variance,
            pattern_count: c.pattern_count as u32,
            recommendation_count: profile.recommendations.len() as u32,
        }
    }
}

/// Output from a single submitted sample.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchSubmitOutput {
    /// 1 while a session is collecting.
    pub collecting: i32,
    /// Patterns sealed so far in the current session.
    pub pattern_count: u32,
    /// 1 if the previous session finished on this call; `profile` is then set.
    pub session_finished: i32,
    pub profile: TouchProfileOutput,
}

/// Configuration for a session.
#[repr(C)]
#[derive(Debug, Clone)]
pub struct TouchSessionConfig {
    /// Session time limit in milliseconds (0 = until stopped).
    pub session_limit_ms: u64,
    /// Device ID string (null-terminated, may be NULL).
    pub device_id: *const c_char,
    /// Pressure source (0 = reported, 1 = reported range, 2 = contact area).
    pub pressure_mode: i32,
    /// Lower bound of the pressure range or contact area (0 = default).
    pub pressure_min: f32,
    /// Upper bound of the pressure range or contact area (0 = default).
    pub pressure_max: f32,
}

fn pressure_mode(config: &TouchSessionConfig) -> Option<PressureMode> {
    match config.pressure_mode {
        0 => Some(PressureMode::Reported),
        1 => Some(PressureMode::Range {
            min: config.pressure_min,
            max: config.pressure_max,
        }),
        2 => {
            let defaults = config.pressure_min == 0.0 && config.pressure_max == 0.0;
            Some(PressureMode::ContactArea {
                min_area: if defaults { DEFAULT_MIN_CONTACT_AREA } else { config.pressure_min },
                max_area: if defaults { DEFAULT_MAX_CONTACT_AREA } else { config.pressure_max },
            })
        }
        _ => None,
    }
}

// ============================================================================
// SESSION LIFECYCLE
// ============================================================================

/// Create a new touch analysis session.
///
/// # Safety
/// - `config` must be NULL or a valid pointer to TouchSessionConfig.
/// - `config.device_id` must be NULL or a valid null-terminated C string.
/// - The returned pointer must be freed with `touch_session_destroy()`.
///
/// # Returns
/// - Pointer to TouchSession on success. A NULL `config` uses defaults.
/// - NULL if the configuration is invalid.
#[no_mangle]
pub unsafe extern "C" fn touch_session_create(config: *const TouchSessionConfig) -> *mut TouchSession {
    let mut analyzer = AnalyzerConfig::default();

    if !config.is_null() {
        let config = &*config;
        analyzer.device_id = if config.device_id.is_null() {
            "unknown".to_string()
        } else {
            match CStr::from_ptr(config.device_id).to_str() {
                Ok(s) => s.to_string(),
                Err(_) => "unknown".to_string(),
            }
        };
        analyzer.collector.session_limit_ms = config.session_limit_ms;
        analyzer.collector.pressure = match pressure_mode(config) {
            Some(mode) => mode,
            None => return ptr::null_mut(),
        };
    }

    if analyzer.validate().is_err() {
        return ptr::null_mut();
    }

    let session = Box::new(TouchSession {
        pipeline: TouchAnalysisPipeline::new(analyzer),
    });
    Box::into_raw(session)
}

/// Destroy a touch analysis session.
///
/// # Safety
/// - `session` must be a valid pointer from `touch_session_create()`.
/// - Must not be called more than once for the same pointer.
#[no_mangle]
pub unsafe extern "C" fn touch_session_destroy(session: *mut TouchSession) {
    if !session.is_null() {
        drop(Box::from_raw(session));
    }
}

/// Drop all collected patterns and return to idle.
///
/// # Safety
/// - `session` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn touch_session_reset(session: *mut TouchSession) -> TouchStatus {
    if session.is_null() {
        return TouchStatus::NullPointer;
    }
    (*session).pipeline.reset();
    TouchStatus::Ok
}

// ============================================================================
// SAMPLE PROCESSING
// ============================================================================

/// Submit a single touch event.
///
/// # Safety
/// - `session` must be a valid pointer.
/// - `output` must be a valid pointer to receive results.
///
/// # Parameters
/// - `action`: Raw action code (0 down, 1 up, 2 move, 3 cancel; pointer bits are masked).
/// - `x`, `y`: Position in pixels.
/// - `pressure`, `size`: As reported by the device.
/// - `touch_major`, `touch_minor`: Contact ellipse axes in pixels (0 if unavailable).
/// - `tool_type`: 0 unknown, 1 finger, 2 stylus, 3 mouse, 4 eraser.
/// - `event_time_ms`, `down_time_ms`: Event and contact-down timestamps.
///
/// Every float parameter must be finite, else `InvalidParameter`.
#[no_mangle]
pub unsafe extern "C" fn touch_session_submit(
    session: *mut TouchSession,
    action: i32,
    x: f32, y: f32,
    pressure: f32, size: f32,
    touch_major: f32, touch_minor: f32,
    tool_type: i32,
    event_time_ms: u64, down_time_ms: u64,
    pointer_count: u32,
    edge_flags: u32,
    output: *mut TouchSubmitOutput,
) -> TouchStatus {
    if session.is_null() || output.is_null() {
        return TouchStatus::NullPointer;
    }
    if [x, y, pressure, size, touch_major, touch_minor]
        .iter()
        .any(|v| !v.is_finite())
    {
        return TouchStatus::InvalidParameter;
    }

    let session = &mut *session;
    let output = &mut *output;

    let mut sample = TouchSample::new(
        TouchAction::from_code(action),
        x,
        y,
        pressure,
        size,
        event_time_ms,
        down_time_ms,
    )
    .with_contact_axes(touch_major, touch_minor);
    sample.tool_type = ToolType::from_code(tool_type);
    sample.pointer_count = pointer_count.max(1);
    sample.edge_flags = EdgeFlags(edge_flags);

    let finished = session.pipeline.submit(&sample);
    fill_submit_output(&session.pipeline, finished.as_ref(), output);
    TouchStatus::Ok
}

/// Check the session time limit without a sample.
///
/// # Safety
/// - `session` must be a valid pointer.
/// - `output` must be a valid pointer to receive results.
#[no_mangle]
pub unsafe extern "C" fn touch_session_poll(
    session: *mut TouchSession,
    now_ms: u64,
    output: *mut TouchSubmitOutput,
) -> TouchStatus {
    if session.is_null() || output.is_null() {
        return TouchStatus::NullPointer;
    }
    let session = &mut *session;
    let finished = session.pipeline.poll(now_ms);
    fill_submit_output(&session.pipeline, finished.as_ref(), &mut *output);
    TouchStatus::Ok
}

/// Stop collection and write the session profile.
///
/// # Safety
/// - `session` must be a valid pointer.
/// - `output` must be a valid pointer to receive the profile.
#[no_mangle]
pub unsafe extern "C" fn touch_session_stop(
    session: *mut TouchSession,
    output: *mut TouchProfileOutput,
) -> TouchStatus {
    if session.is_null() || output.is_null() {
        return TouchStatus::NullPointer;
    }
    let profile = (*session).pipeline.stop();
    *output = TouchProfileOutput::from(&profile);
    TouchStatus::Ok
}

fn fill_submit_output(
    pipeline: &TouchAnalysisPipeline,
    finished: Option<&ElderlyTouchProfile>,
    output: &mut TouchSubmitOutput,
) {
    output.collecting = pipeline.is_collecting() as i32;
    output.pattern_count = pipeline.patterns().len() as u32;
    match finished {
        Some(profile) => {
            output.session_finished = 1;
            output.profile = TouchProfileOutput::from(profile);
        }
        None => {
            output.session_finished = 0;
            output.profile = TouchProfileOutput::default();
        }
    }
}

// ============================================================================
// REPORTS & EXPORT
// ============================================================================

/// Get the detailed text report for the current (or most recent) session.
///
/// # Safety
/// - `session` must be a valid pointer.
///
/// # Returns
/// - Report string (MUST be freed with `touch_free_string()`).
/// - NULL on error.
#[no_mangle]
pub unsafe extern "C" fn touch_session_report(session: *const TouchSession) -> *mut c_char {
    if session.is_null() {
        return ptr::null_mut();
    }
    into_c_string((*session).pipeline.report())
}

/// Export the current (or most recent) session as JSON.
///
/// # Safety
/// - `session` must be a valid pointer.
///
/// # Returns
/// - JSON string (MUST be freed with `touch_free_string()`).
/// - NULL on error.
#[no_mangle]
pub unsafe extern "C" fn touch_session_export_json(
    session: *const TouchSession,
    include_patterns: i32,
) -> *mut c_char {
    if session.is_null() {
        return ptr::null_mut();
    }
    match (*session).pipeline.export(include_patterns != 0).to_json() {
        Ok(json) => into_c_string(json),
        Err(_) => ptr::null_mut(),
    }
}

/// Free a string returned by `touch_session_report()` or `touch_session_export_json()`.
///
/// # Safety
/// - `ptr` must be a string returned by one of those functions.
/// - Must not be called more than once for the same pointer.
#[no_mangle]
pub unsafe extern "C" fn touch_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

fn into_c_string(text: String) -> *mut c_char {
    match CString::new(text) {
        Ok(cstring) => cstring.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// STATUS QUERIES
// ============================================================================

/// Number of patterns in the current (or most recent) session.
///
/// # Safety
/// - `session` must be NULL or a valid pointer from `touch_session_create()`.
///
/// # Returns
/// - Pattern count, or -1 on NULL.
#[no_mangle]
pub unsafe extern "C" fn touch_session_pattern_count(session: *const TouchSession) -> i32 {
    if session.is_null() {
        return -1;
    }
    (*session).pipeline.patterns().len() as i32
}

/// Whether the session is collecting.
///
/// # Safety
/// - `session` must be NULL or a valid pointer from `touch_session_create()`.
///
/// # Returns
/// - 1 while collecting, 0 when idle, -1 on NULL.
#[no_mangle]
pub unsafe extern "C" fn touch_session_is_collecting(session: *const TouchSession) -> i32 {
    if session.is_null() {
        return -1;
    }
    (*session).pipeline.is_collecting() as i32
}

/// Get the library version string.
///
/// # Returns
/// - Static string, do NOT free.
#[no_mangle]
pub extern "C" fn touch_version() -> *const c_char {
    static VERSION: &[u8] = concat!("touch-pattern-engine/", env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

// ============================================================================
// TESTS
// ============================================================================
