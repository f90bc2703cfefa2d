//! Exchange resolution — static venue table for asset leaves.
//!
//! Every asset node wants a venue code and a display name. Known tickers
//! resolve from the table below; unknown tickers fall back to the default
//! code, and the caller collects a warning so the gap is visible before
//! the platform sees it.

/// Fallback venue code for tickers not in the table.
pub const DEFAULT_EXCHANGE: &str = "XNAS";

/// Venue and display metadata for a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    pub ticker: &'static str,
    pub exchange: &'static str,
    pub name: &'static str,
}

/// Known listings. Small by design — the upstream generator works from a
/// bounded ETF/large-cap universe, and anything outside it still deploys
/// under the default venue code.
pub const LISTINGS: &[Listing] = &[
    // Broad-market and sector ETFs
    Listing { ticker: "SPY", exchange: "ARCX", name: "SPDR S&P 500 ETF Trust" },
    Listing { ticker: "VOO", exchange: "ARCX", name: "Vanguard S&P 500 ETF" },
    Listing { ticker: "VTI", exchange: "ARCX", name: "Vanguard Total Stock Market ETF" },
    Listing { ticker: "QQQ", exchange: "XNAS", name: "Invesco QQQ Trust" },
    Listing { ticker: "IWM", exchange: "ARCX", name: "iShares Russell 2000 ETF" },
    Listing { ticker: "DIA", exchange: "ARCX", name: "SPDR Dow Jones Industrial Average ETF" },
    Listing { ticker: "EEM", exchange: "ARCX", name: "iShares MSCI Emerging Markets ETF" },
    Listing { ticker: "EFA", exchange: "ARCX", name: "iShares MSCI EAFE ETF" },
    Listing { ticker: "XLF", exchange: "ARCX", name: "Financial Select Sector SPDR Fund" },
    Listing { ticker: "XLK", exchange: "ARCX", name: "Technology Select Sector SPDR Fund" },
    Listing { ticker: "XLE", exchange: "ARCX", name: "Energy Select Sector SPDR Fund" },
    Listing { ticker: "XLV", exchange: "ARCX", name: "Health Care Select Sector SPDR Fund" },
    // Fixed income and cash-like
    Listing { ticker: "AGG", exchange: "ARCX", name: "iShares Core U.S. Aggregate Bond ETF" },
    Listing { ticker: "BND", exchange: "XNAS", name: "Vanguard Total Bond Market ETF" },
    Listing { ticker: "TLT", exchange: "XNAS", name: "iShares 20+ Year Treasury Bond ETF" },
    Listing { ticker: "IEF", exchange: "XNAS", name: "iShares 7-10 Year Treasury Bond ETF" },
    Listing { ticker: "SHY", exchange: "XNAS", name: "iShares 1-3 Year Treasury Bond ETF" },
    Listing { ticker: "BIL", exchange: "ARCX", name: "SPDR Bloomberg 1-3 Month T-Bill ETF" },
    Listing { ticker: "LQD", exchange: "ARCX", name: "iShares iBoxx $ Investment Grade Corporate Bond ETF" },
    Listing { ticker: "HYG", exchange: "ARCX", name: "iShares iBoxx $ High Yield Corporate Bond ETF" },
    // Commodities
    Listing { ticker: "GLD", exchange: "ARCX", name: "SPDR Gold Shares" },
    Listing { ticker: "SLV", exchange: "ARCX", name: "iShares Silver Trust" },
    // Volatility and leveraged/inverse products
    Listing { ticker: "VIXY", exchange: "BATS", name: "ProShares VIX Short-Term Futures ETF" },
    Listing { ticker: "UVXY", exchange: "BATS", name: "ProShares Ultra VIX Short-Term Futures ETF" },
    Listing { ticker: "SVXY", exchange: "BATS", name: "ProShares Short VIX Short-Term Futures ETF" },
    Listing { ticker: "TQQQ", exchange: "XNAS", name: "ProShares UltraPro QQQ" },
    Listing { ticker: "SQQQ", exchange: "XNAS", name: "ProShares UltraPro Short QQQ" },
    Listing { ticker: "UPRO", exchange: "ARCX", name: "ProShares UltraPro S&P 500" },
    Listing { ticker: "SPXU", exchange: "ARCX", name: "ProShares UltraPro Short S&P 500" },
    Listing { ticker: "SH", exchange: "ARCX", name: "ProShares Short S&P 500" },
    Listing { ticker: "PSQ", exchange: "XNAS", name: "ProShares Short QQQ" },
    // Large-cap singles the generator reaches for
    Listing { ticker: "AAPL", exchange: "XNAS", name: "Apple Inc." },
    Listing { ticker: "MSFT", exchange: "XNAS", name: "Microsoft Corporation" },
    Listing { ticker: "NVDA", exchange: "XNAS", name: "NVIDIA Corporation" },
    Listing { ticker: "AMZN", exchange: "XNAS", name: "Amazon.com, Inc." },
    Listing { ticker: "GOOGL", exchange: "XNAS", name: "Alphabet Inc." },
    Listing { ticker: "META", exchange: "XNAS", name: "Meta Platforms, Inc." },
    Listing { ticker: "TSLA", exchange: "XNAS", name: "Tesla, Inc." },
    Listing { ticker: "JPM", exchange: "XNYS", name: "JPMorgan Chase & Co." },
    Listing { ticker: "BRK.B", exchange: "XNYS", name: "Berkshire Hathaway Inc." },
];

/// Look up a ticker's listing, if known.
pub fn lookup(ticker: &str) -> Option<&'static Listing> {
    LISTINGS.iter().find(|l| l.ticker == ticker)
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_etf_resolves() {
        let l = lookup("SPY").unwrap();
        assert_eq!(l.exchange, "ARCX");
        assert_eq!(l.name, "SPDR S&P 500 ETF Trust");
    }

    #[test]
    fn volatility_products_on_bats() {
        assert_eq!(lookup("VIXY").unwrap().exchange, "BATS");
        assert_eq!(lookup("UVXY").unwrap().exchange, "BATS");
    }

    #[test]
    fn unknown_ticker_returns_none() {
        assert!(lookup("ZZZTOP").is_none());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        // Operand resolution upstream only produces uppercase tickers.
        assert!(lookup("spy").is_none());
    }

    #[test]
    fn table_has_no_duplicate_tickers() {
        let mut seen = std::collections::HashSet::new();
        for l in LISTINGS {
            assert!(seen.insert(l.ticker), "duplicate listing for {}", l.ticker);
        }
    }
}
