// self
use crate::{
	_prelude::*,
	obs::{AttemptKind, ExchangeClass},
};

/// Counts a settled exchange and records how long it took (when `metrics` is enabled).
pub fn record_exchange(kind: AttemptKind, class: ExchangeClass, elapsed: Duration) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"crm_api_client_exchange_total",
			"attempt" => kind.as_str(),
			"class" => class.as_str()
		)
		.increment(1);
		metrics::histogram!(
			"crm_api_client_exchange_duration_seconds",
			"attempt" => kind.as_str()
		)
		.record(elapsed.as_secs_f64());
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, class, elapsed);
	}
}
