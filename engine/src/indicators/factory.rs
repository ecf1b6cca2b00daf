//! Indicator registry: the one place that knows which indicator types exist,
//! how to build them from a period, and how to describe them.

use std::collections::HashMap;

use super::{BollingerBands, Ema, IndicatorCalculator, Macd, Rsi, Sma, StochasticOscillator, WilliamsR};
use crate::config::IndicatorSettings;
use crate::error::EngineError;
use crate::models::{IndicatorDescriptor, IndicatorKind};

/// Constructor closure building an indicator from a period.
pub type IndicatorConstructor =
    Box<dyn Fn(usize) -> Result<Box<dyn IndicatorCalculator>, EngineError> + Send + Sync>;

struct Registration {
    descriptor: IndicatorDescriptor,
    constructor: IndicatorConstructor,
}

/// Immutable registry of supported indicators.
///
/// Built once from [`IndicatorSettings`] and shared (usually behind an `Arc`)
/// by every component that needs to create or list indicators.
pub struct IndicatorFactory {
    registrations: HashMap<IndicatorKind, Registration>,
}

impl IndicatorFactory {
    pub fn new(settings: &IndicatorSettings) -> Self {
        let mut factory = Self { registrations: HashMap::new() };
        let max = settings.max_period;

        factory.register(descriptor(IndicatorKind::Sma, "Simple Moving Average", settings.sma_period, 1, max), |period| {
            Ok(Box::new(Sma::new(period)?))
        });
        factory.register(descriptor(IndicatorKind::Ema, "Exponential Moving Average", settings.ema_period, 1, max), |period| {
            Ok(Box::new(Ema::new(period)?))
        });
        factory.register(descriptor(IndicatorKind::Rsi, "Relative Strength Index", settings.rsi_period, 2, max), |period| {
            Ok(Box::new(Rsi::new(period)?))
        });

        let std_factor = settings.bollinger_std_factor;
        factory.register(
            descriptor(IndicatorKind::BollingerBands, "Bollinger Bands", settings.bollinger_period, 2, max),
            move |period| Ok(Box::new(BollingerBands::new(period, std_factor)?)),
        );
        factory.register(
            descriptor(IndicatorKind::Stochastic, "Stochastic Oscillator", settings.stochastic_period, 1, max),
            |period| Ok(Box::new(StochasticOscillator::new(period)?)),
        );

        // For MACD the period is the fast period; slow and signal come from settings.
        let (slow, signal) = (settings.macd_slow_period, settings.macd_signal_period);
        factory.register(
            descriptor(IndicatorKind::Macd, "Moving Average Convergence Divergence", settings.macd_fast_period, 1, slow.saturating_sub(1).max(1)),
            move |period| Ok(Box::new(Macd::new(period, slow, signal)?)),
        );
        factory.register(
            descriptor(IndicatorKind::WilliamsR, "Williams %R", settings.williams_r_period, 1, max),
            |period| Ok(Box::new(WilliamsR::new(period)?)),
        );

        factory
    }

    fn register<F>(&mut self, descriptor: IndicatorDescriptor, constructor: F)
    where
        F: Fn(usize) -> Result<Box<dyn IndicatorCalculator>, EngineError> + Send + Sync + 'static,
    {
        self.registrations.insert(
            descriptor.kind,
            Registration {
                descriptor,
                constructor: Box::new(constructor),
            },
        );
    }

    /// Builds a validated indicator. `period == 0`, a period outside the
    /// descriptor's range and indicator-specific violations (e.g. MACD
    /// fast >= slow) are `ValidationError`s.
    pub fn create_indicator(&self, kind: IndicatorKind, period: usize) -> Result<Box<dyn IndicatorCalculator>, EngineError> {
        if period == 0 {
            return Err(EngineError::validation("period must be greater than 0"));
        }
        let registration = self.registration(kind)?;
        let d = &registration.descriptor;
        if period < d.min_period || period > d.max_period {
            return Err(EngineError::validation(format!(
                "{} period must be between {} and {}, got {}",
                d.short_name, d.min_period, d.max_period, period
            )));
        }
        let indicator = (registration.constructor)(period)?;
        tracing::debug!(indicator = %indicator.name(), "Created indicator");
        Ok(indicator)
    }

    pub fn describe(&self, kind: IndicatorKind) -> Result<IndicatorDescriptor, EngineError> {
        Ok(self.registration(kind)?.descriptor.clone())
    }

    /// Registered kinds in a stable order.
    pub fn list_supported_types(&self) -> Vec<IndicatorKind> {
        let mut kinds: Vec<IndicatorKind> = self.registrations.keys().copied().collect();
        kinds.sort();
        kinds
    }

    fn registration(&self, kind: IndicatorKind) -> Result<&Registration, EngineError> {
        self.registrations
            .get(&kind)
            .ok_or_else(|| EngineError::validation(format!("Unknown indicator type: {}", kind)))
    }
}

impl Default for IndicatorFactory {
    fn default() -> Self {
        Self::new(&IndicatorSettings::default())
    }
}

fn descriptor(kind: IndicatorKind, name: &str, default_period: usize, min_period: usize, max_period: usize) -> IndicatorDescriptor {
    IndicatorDescriptor {
        kind,
        name: name.to_string(),
        short_name: kind.short_name().to_string(),
        default_period,
        min_period,
        max_period,
    }
}
