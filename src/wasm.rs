//! WASM bindings for DMX LUT.
//!
//! This module provides JavaScript-friendly bindings for previewing map
//! files in a browser-based editor.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmLut } from 'dmx_lut';
//!
//! await init();
//!
//! const lut = new WasmLut("10/3 20\n", "directive");
//! console.log(lut.messages);
//!
//! const output = lut.remap(inputFrame);
//! ```

use wasm_bindgen::prelude::*;

use crate::config::LoaderConfig;
use crate::diagnostics::{DiagnosticsLog, MemorySink};
use crate::error::LutError;
use crate::lut::Lut;
use crate::parser::{self, Format, ParseOutcome};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// A remap table parsed from map text.
#[wasm_bindgen]
pub struct WasmLut {
    table: Lut,
    messages: Vec<String>,
    completed: bool,
}

#[wasm_bindgen]
impl WasmLut {
    /// Parse `text` in `format` ("tabular" or "directive").
    #[wasm_bindgen(constructor)]
    pub fn new(text: &str, format: &str) -> Result<WasmLut, JsValue> {
        let format: Format = format.parse().map_err(|e: LutError| {
            JsValue::from_str(
                &LutError::WasmError {
                    message: e.to_string(),
                }
                .to_string(),
            )
        })?;

        let mut table = Lut::identity();
        let mut log = DiagnosticsLog::new(MemorySink::default());
        let outcome = parser::parse_str(format, text, &mut table, &mut log, &LoaderConfig::default());

        let messages = log.sink().lines().into_iter().map(str::to_string).collect();

        Ok(WasmLut {
            table,
            messages,
            completed: outcome == ParseOutcome::Completed,
        })
    }

    /// Encoded slot values, one per output channel.
    #[wasm_bindgen]
    pub fn table(&self) -> Vec<u16> {
        self.table.to_raw().to_vec()
    }

    /// Every diagnostic produced while parsing, one per line.
    #[wasm_bindgen(getter)]
    pub fn messages(&self) -> String {
        self.messages.join("\n")
    }

    /// Whether the parse ran to the end of the text.
    #[wasm_bindgen(getter)]
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Apply the table to a frame of channel values.
    #[wasm_bindgen]
    pub fn remap(&self, input: &[u8]) -> Vec<u8> {
        let mut output = vec![0u8; input.len().min(crate::lut::CHANNEL_COUNT)];
        self.table.remap(input, &mut output);
        output
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
