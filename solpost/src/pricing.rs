//! Pure fiat pricing and SOL conversion.
//!
//! Pricing is two-tier flat (domestic vs international) plus a color
//! surcharge, not distance-based. Conversion to lamports always rounds up to
//! the next whole lamport so a payer can never round their way below the
//! quoted fiat price.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::rates::SolRate;
use crate::request::PrintOptions;

/// Lamports per SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

const DOMESTIC_DELIVERY: &str = "3-5 business days";
const INTERNATIONAL_DELIVERY: &str = "7-14 business days";

/// Flat pricing table in USD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingTable {
    /// Country code priced at the domestic rate.
    pub home_country: String,
    /// Base price for domestic letters.
    pub domestic_usd: Decimal,
    /// Base price for all other destinations.
    pub international_usd: Decimal,
    /// Surcharge for color printing.
    pub color_usd: Decimal,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            home_country: "US".to_owned(),
            domestic_usd: Decimal::new(150, 2),
            international_usd: Decimal::new(250, 2),
            color_usd: Decimal::new(50, 2),
        }
    }
}

/// A freshly computed price quote. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Destination country the quote was computed for.
    pub country: String,
    /// Base price component.
    pub base_usd: Decimal,
    /// Color surcharge component (zero when not selected).
    pub color_usd: Decimal,
    /// Total fiat price.
    pub total_usd: Decimal,
    /// Exchange rate used, USD per SOL.
    pub sol_price_usd: Decimal,
    /// Total price in SOL.
    pub total_sol: Decimal,
    /// On-chain amount, rounded up to whole lamports.
    pub lamports: u64,
    /// Delivery window for display.
    pub estimated_delivery: &'static str,
}

impl PricingTable {
    /// Computes a quote for a destination and print options at a given rate.
    ///
    /// Deterministic and free of I/O: identical inputs with a fixed rate
    /// produce identical quotes.
    #[must_use]
    pub fn quote(&self, country: &str, options: &PrintOptions, rate: SolRate) -> Quote {
        let domestic = country.eq_ignore_ascii_case(&self.home_country);
        let base_usd = if domestic {
            self.domestic_usd
        } else {
            self.international_usd
        };
        let color_usd = if options.color {
            self.color_usd
        } else {
            Decimal::ZERO
        };
        let total_usd = base_usd + color_usd;
        let sol_price_usd = rate.usd_per_sol();
        let total_sol = total_usd / sol_price_usd;

        Quote {
            country: country.to_owned(),
            base_usd,
            color_usd,
            total_usd,
            sol_price_usd,
            total_sol,
            lamports: lamports_ceil(total_sol),
            estimated_delivery: if domestic {
                DOMESTIC_DELIVERY
            } else {
                INTERNATIONAL_DELIVERY
            },
        }
    }
}

/// Rounds a SOL amount up to whole lamports, saturating at `u64::MAX`.
fn lamports_ceil(sol: Decimal) -> u64 {
    (sol * Decimal::from(LAMPORTS_PER_SOL))
        .ceil()
        .to_u64()
        .unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(usd: i64, scale: u32) -> SolRate {
        SolRate::new(Decimal::new(usd, scale)).unwrap()
    }

    fn color() -> PrintOptions {
        PrintOptions {
            color: true,
            ..PrintOptions::default()
        }
    }

    #[test]
    fn domestic_base_price_without_color() {
        let quote = PricingTable::default().quote("US", &PrintOptions::default(), rate(100, 0));
        assert_eq!(quote.total_usd, Decimal::new(150, 2));
        assert_eq!(quote.base_usd, Decimal::new(150, 2));
        assert_eq!(quote.color_usd, Decimal::ZERO);
        assert_eq!(quote.estimated_delivery, "3-5 business days");
    }

    #[test]
    fn international_base_plus_color_surcharge() {
        let quote = PricingTable::default().quote("GB", &color(), rate(100, 0));
        assert_eq!(quote.total_usd, Decimal::new(300, 2));
        assert_eq!(quote.estimated_delivery, "7-14 business days");
    }

    #[test]
    fn home_country_comparison_is_case_insensitive() {
        let table = PricingTable::default();
        let lower = table.quote("us", &PrintOptions::default(), rate(100, 0));
        assert_eq!(lower.total_usd, table.domestic_usd);
    }

    #[test]
    fn lamports_round_up_never_down() {
        // $1.50 at $97/SOL = 0.015463917... SOL; the lamport amount must
        // cover the fiat price exactly or over, never under.
        let quote = PricingTable::default().quote("US", &PrintOptions::default(), rate(97, 0));
        let paid_sol = Decimal::from(quote.lamports) / Decimal::from(LAMPORTS_PER_SOL);
        assert!(paid_sol * quote.sol_price_usd >= quote.total_usd);
        assert_eq!(quote.lamports, 15_463_918);
    }

    #[test]
    fn ceiling_property_holds_across_rates() {
        let table = PricingTable::default();
        for (units, scale) in [(1, 0), (997, 1), (10_001, 2), (250_000, 3), (123_456_789, 4)] {
            let r = rate(units, scale);
            for country in ["US", "GB"] {
                for options in [PrintOptions::default(), color()] {
                    let quote = table.quote(country, &options, r);
                    let paid_sol =
                        Decimal::from(quote.lamports) / Decimal::from(LAMPORTS_PER_SOL);
                    assert!(
                        paid_sol * r.usd_per_sol() >= quote.total_usd,
                        "under-charge at rate {} for {country}",
                        r.usd_per_sol()
                    );
                }
            }
        }
    }

    #[test]
    fn quotes_are_idempotent_for_fixed_inputs() {
        let table = PricingTable::default();
        let a = table.quote("CA", &color(), rate(15_525, 2));
        let b = table.quote("CA", &color(), rate(15_525, 2));
        assert_eq!(a, b);
    }
}
