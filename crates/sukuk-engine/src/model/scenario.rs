//! Scenario registry.
//!
//! A scenario is one sheet of the workbook: which financing cost is taken
//! before tax, and whether the firm carries conventional debt at all.

use std::fmt;

/// Which financing cost is deducted before tax.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum TaxShield {
    /// NTS: no tax shield.
    None,
    /// ITS: interest on debt before tax.
    Interest,
    /// RTS: sukuk rent before tax.
    Rent,
    /// DTS: dividend before tax.
    Dividend,
    /// DTS+RTS: dividend and sukuk rent before tax.
    DividendAndRent,
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Leverage {
    /// "-L": debt, sukuk and equity.
    Leveraged,
    /// "-ZL": no conventional debt.
    ZeroDebt,
}

/// The boolean switches the row rules branch on.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ScenarioFlags {
    pub interest_before_tax: bool,
    pub rent_before_tax: bool,
    pub zero_debt: bool,
    pub no_dividend_before_tax: bool,
    pub dts_dividend_formula: bool,
    pub dts_rts_dividend_formula: bool,
    pub rent_uses_alt_rent_row: bool,
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct Scenario {
    pub shield: TaxShield,
    pub leverage: Leverage,
}

const SHIELDS: [TaxShield; 5] = [
    TaxShield::None,
    TaxShield::Interest,
    TaxShield::Rent,
    TaxShield::Dividend,
    TaxShield::DividendAndRent,
];

impl Scenario {
    pub const fn new(shield: TaxShield, leverage: Leverage) -> Scenario {
        Scenario { shield, leverage }
    }

    /// Registry name, e.g. `NTS-L` or `(DTS+RTS)-ZL`.
    pub fn name(&self) -> String {
        format!("{}-{}", self.shield_code(), self.leverage_code())
    }

    pub fn shield_code(&self) -> &'static str {
        match self.shield {
            TaxShield::None => "NTS",
            TaxShield::Interest => "ITS",
            TaxShield::Rent => "RTS",
            TaxShield::Dividend => "DTS",
            TaxShield::DividendAndRent => "(DTS+RTS)",
        }
    }

    pub fn leverage_code(&self) -> &'static str {
        match self.leverage {
            Leverage::Leveraged => "L",
            Leverage::ZeroDebt => "ZL",
        }
    }

    /// Look a scenario up by its registry name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Scenario> {
        let wanted = name.trim();
        all_scenarios()
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(wanted))
    }

    /// Whether the dividend is deducted before tax (alone or with rent).
    pub fn dividend_before_tax(&self) -> bool {
        matches!(self.shield, TaxShield::Dividend | TaxShield::DividendAndRent)
    }

    pub fn flags(&self) -> ScenarioFlags {
        let rent_before_tax = matches!(self.shield, TaxShield::Rent | TaxShield::DividendAndRent);
        ScenarioFlags {
            interest_before_tax: self.shield == TaxShield::Interest,
            rent_before_tax,
            zero_debt: self.leverage == Leverage::ZeroDebt,
            no_dividend_before_tax: self.shield == TaxShield::Rent,
            dts_dividend_formula: self.shield == TaxShield::Dividend,
            dts_rts_dividend_formula: self.shield == TaxShield::DividendAndRent,
            rent_uses_alt_rent_row: rent_before_tax,
        }
    }

    /// Sheet title written above the labels.
    pub fn title(&self) -> String {
        let shield = match self.shield {
            TaxShield::None => "NO TAX SHIELD",
            TaxShield::Interest => "INTEREST TAX SHIELD",
            TaxShield::Rent => "RENTAL TAX SHIELD",
            TaxShield::Dividend => "DIVIDEND TAX SHIELD",
            TaxShield::DividendAndRent => "DIVIDEND AND RENTAL TAX SHIELD",
        };
        let leverage = match self.leverage {
            Leverage::Leveraged => "WITH LEVERAGE",
            Leverage::ZeroDebt => "WITH ZERO DEBT",
        };
        format!("{} {}", shield, leverage)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// All modelled scenarios: the five leveraged sheets, then their zero-debt
/// mirrors.
pub fn all_scenarios() -> Vec<Scenario> {
    [Leverage::Leveraged, Leverage::ZeroDebt]
        .into_iter()
        .flat_map(|leverage| SHIELDS.into_iter().map(move |shield| Scenario::new(shield, leverage)))
        .collect()
}
