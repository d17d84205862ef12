//! FFI bindings for Streakline
//!
//! This module provides C-compatible functions for calling Streakline from a
//! host application. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using
//! `streakline_free_string`.
//!
//! Reference days are passed as `YYYY-MM-DD`. A NULL or empty `today` means
//! "use the local clock".

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::NaiveDate;

use crate::calendar::{parse_date, today as local_today};
use crate::config::EngineConfig;
use crate::pipeline::{export_to_report, habit_statistics_json, StatsProcessor};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Resolve the reference day argument, falling back to the local clock
unsafe fn resolve_today(ptr: *const c_char) -> Result<NaiveDate, String> {
    if ptr.is_null() {
        return Ok(local_today());
    }
    let raw = CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| "Invalid today string pointer".to_string())?;
    if raw.is_empty() {
        return Ok(local_today());
    }
    parse_date(raw).map_err(|e| e.to_string())
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute the statistics report for an export document.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - `today` must be NULL or a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `streakline_free_string`.
/// - Returns NULL on error; call `streakline_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn streakline_export_to_report(
    json: *const c_char,
    today: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let day = match resolve_today(today) {
        Ok(d) => d,
        Err(e) => {
            set_last_error(&e);
            return ptr::null_mut();
        }
    };

    match export_to_report(json_str, day) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Compute the statistics summary for one habit of an export document.
///
/// # Safety
/// - `json` and `habit_id` must be valid null-terminated C strings.
/// - `today` must be NULL or a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `streakline_free_string`.
/// - Returns NULL on error; call `streakline_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn streakline_habit_statistics(
    json: *const c_char,
    habit_id: *const c_char,
    today: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let habit_str = match cstr_to_string(habit_id) {
        Some(s) => s,
        None => {
            set_last_error("Invalid habit_id string pointer");
            return ptr::null_mut();
        }
    };

    let day = match resolve_today(today) {
        Ok(d) => d,
        Err(e) => {
            set_last_error(&e);
            return ptr::null_mut();
        }
    };

    match habit_statistics_json(&json_str, &habit_str, day) {
        Ok(summary) => string_to_cstr(&summary),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to a StatsProcessor
pub struct StatsProcessorHandle {
    processor: StatsProcessor,
}

/// Create a new StatsProcessor.
///
/// # Safety
/// - `config_json` must be NULL (default configuration) or a valid
///   null-terminated C string holding an engine configuration.
/// - Returns a pointer that must be freed with `streakline_processor_free`.
/// - Returns NULL on error; call `streakline_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn streakline_processor_new(
    config_json: *const c_char,
) -> *mut StatsProcessorHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        EngineConfig::default()
    } else {
        let config_str = match cstr_to_string(config_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        };
        match EngineConfig::from_json(&config_str) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    match StatsProcessor::with_config(config) {
        Ok(processor) => Box::into_raw(Box::new(StatsProcessorHandle { processor })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a StatsProcessor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `streakline_processor_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn streakline_processor_free(processor: *mut StatsProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Compute the statistics report with a stateful processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `streakline_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - `today` must be NULL or a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `streakline_free_string`.
/// - Returns NULL on error; call `streakline_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn streakline_processor_report(
    processor: *const StatsProcessorHandle,
    json: *const c_char,
    today: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let day = match resolve_today(today) {
        Ok(d) => d,
        Err(e) => {
            set_last_error(&e);
            return ptr::null_mut();
        }
    };

    match handle.processor.process_export(&json_str, day) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Streakline functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Streakline function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn streakline_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Streakline call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn streakline_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Streakline library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn streakline_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
