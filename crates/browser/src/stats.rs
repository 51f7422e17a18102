//! Summary statistics over a displayed page, and number formatting.

use catalog::Channel;

/// Aggregates over the channels currently on screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageStats {
    pub total_channels: usize,
    pub total_subscribers: u64,
    pub avg_subscribers: f64,
    pub total_revenue: f64,
    pub avg_monthly_revenue: f64,
    pub avg_rpm: f64,
    pub total_views: u64,
    pub monetized_count: usize,
    pub faceless_count: usize,
}

impl PageStats {
    /// Compute stats for a page. An empty page yields all zeros.
    pub fn compute(channels: &[Channel]) -> Self {
        let n = channels.len();
        if n == 0 {
            return Self::default();
        }

        let total_subscribers: u64 = channels.iter().map(|c| c.subscribers).sum();
        let total_revenue: f64 = channels.iter().map(|c| c.total_revenue_generated).sum();
        let monthly_revenue: f64 = channels.iter().map(|c| c.avg_monthly_revenue).sum();
        let rpm: f64 = channels.iter().map(|c| c.rpm).sum();

        Self {
            total_channels: n,
            total_subscribers,
            avg_subscribers: total_subscribers as f64 / n as f64,
            total_revenue,
            avg_monthly_revenue: monthly_revenue / n as f64,
            avg_rpm: rpm / n as f64,
            total_views: channels.iter().map(|c| c.total_views).sum(),
            monetized_count: channels.iter().filter(|c| c.is_monetized).count(),
            faceless_count: channels.iter().filter(|c| c.is_faceless).count(),
        }
    }
}

/// Abbreviate large numbers: `1234` -> `1.23K`, `5_600_000` -> `5.60M`
pub fn format_number(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000_000.0 {
        format!("{:.2}B", value / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.2}K", value / 1_000.0)
    } else if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// US dollars with two decimals and thousands separators
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = group_thousands(cents / 100);
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${whole}.{:02}", cents % 100)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
