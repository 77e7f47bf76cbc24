pub mod calc;
pub mod input;
pub mod motivation;
pub mod weather;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::trace::SessionTrace;
use input::{FieldError, MalformedInput};
use weather::{WeatherClient, WeatherError};

pub const CALC_ERROR_PREFIX: &str = "Error dalam perhitungan: ";
pub const WEATHER_ERROR_PREFIX: &str = "Gagal mengambil data cuaca: ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error(transparent)]
    Malformed(#[from] MalformedInput),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Upstream(#[from] WeatherError),
}

/// The closed set of tools the model may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Multiply,
    GetMotivation,
    GetWeather,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Multiply, Tool::GetMotivation, Tool::GetWeather];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Multiply => "multiply",
            Tool::GetMotivation => "get_motivation",
            Tool::GetWeather => "get_weather",
        }
    }

    /// Shown to the model verbatim; it picks tools from these texts.
    pub fn description(self) -> &'static str {
        match self {
            Tool::Multiply => {
                "Gunakan alat ini untuk menghitung proyeksi keuntungan, kerugian, atau break-even point (BEP). \
                 Input format: 'a=10000;b=50' (artinya 10000 dikali 50)"
            }
            Tool::GetMotivation => {
                "Gunakan alat ini ketika pengguna terlihat sedih, putus asa, atau butuh semangat bisnis. \
                 Input: kata kunci (opsional), misal 'bisnis' atau kosongkan saja."
            }
            Tool::GetWeather => {
                "Dapatkan cuaca terkini berdasarkan koordinat untuk analisis lokasi bisnis. \
                 Penting untuk menyarankan jenis bisnis (misal: hujan cocok jual bakso). \
                 Input format: 'lat=-6.2;lon=106.8'"
            }
        }
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.name() == value)
            .ok_or_else(|| unknown_tool_message(value))
    }
}

pub fn unknown_tool_message(name: &str) -> String {
    let names = Tool::ALL.map(Tool::name).join(", ");
    format!("{name} bukan alat yang valid, coba salah satu dari [{names}].")
}

/// Runs tools and folds their failures into plain-text results.
#[derive(Clone)]
pub struct Toolbox {
    weather: WeatherClient,
    trace: Option<SessionTrace>,
}

impl fmt::Debug for Toolbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toolbox")
            .field("weather", &self.weather)
            .field("traced", &self.trace.is_some())
            .finish()
    }
}

impl Toolbox {
    pub fn new(weather: WeatherClient) -> Self {
        Self {
            weather,
            trace: None,
        }
    }

    pub fn with_trace(mut self, trace: SessionTrace) -> Self {
        self.trace = Some(trace);
        self
    }

    pub async fn invoke(&self, tool: Tool, input: &str) -> String {
        if let Some(trace) = &self.trace {
            trace.log_tool_call(tool.name(), input);
        }

        let output = match tool {
            Tool::Multiply => {
                calc::multiply(input).unwrap_or_else(|err| format!("{CALC_ERROR_PREFIX}{err}"))
            }
            Tool::GetMotivation => motivation::get_motivation(input),
            Tool::GetWeather => self
                .weather
                .get_weather(input)
                .await
                .unwrap_or_else(|err| format!("{WEATHER_ERROR_PREFIX}{err}")),
        };

        if let Some(trace) = &self.trace {
            trace.log_tool_output(tool.name(), &output);
        }
        output
    }

    /// Looks the tool up by the name the model used.
    pub async fn invoke_named(&self, name: &str, input: &str) -> String {
        match Tool::from_str(name) {
            Ok(tool) => self.invoke(tool, input).await,
            Err(message) => message,
        }
    }
}
