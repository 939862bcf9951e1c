//! CIF valuation and import taxes
//!
//! Customs valuation is CIF (FOB + freight + insurance). Ad valorem duty is
//! charged on CIF; IGV and IPM on CIF plus duty; perception on everything
//! before it.

use serde::{Deserialize, Serialize};

use crate::numeric::round2;

/// Tax rates as fractions (0.16 = 16%)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxRates {
    pub ad_valorem: f64,
    pub igv: f64,
    pub ipm: f64,
    pub perception: f64,
}

impl Default for TaxRates {
    fn default() -> Self {
        Self {
            ad_valorem: 0.04,
            igv: 0.16,
            ipm: 0.02,
            perception: 0.035,
        }
    }
}

/// Which taxes do not apply to a shipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxExemptions {
    pub ad_valorem: bool,
    pub igv: bool,
    pub ipm: bool,
    pub perception: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImportTaxes {
    pub cif: f64,
    pub ad_valorem: f64,
    pub igv: f64,
    pub ipm: f64,
    pub perception: f64,
    pub total: f64,
}

pub fn calculate_cif(fob: f64, freight: f64, insurance: f64) -> f64 {
    round2(fob + freight + insurance)
}

pub fn calculate_import_taxes(
    cif: f64,
    rates: &TaxRates,
    exemptions: &TaxExemptions,
) -> ImportTaxes {
    let apply = |exempt: bool, base: f64, rate: f64| if exempt { 0.0 } else { base * rate };

    let ad_valorem = apply(exemptions.ad_valorem, cif, rates.ad_valorem);
    let sales_base = cif + ad_valorem;
    let igv = apply(exemptions.igv, sales_base, rates.igv);
    let ipm = apply(exemptions.ipm, sales_base, rates.ipm);
    let perception = apply(exemptions.perception, sales_base + igv + ipm, rates.perception);

    ImportTaxes {
        cif: round2(cif),
        ad_valorem: round2(ad_valorem),
        igv: round2(igv),
        ipm: round2(ipm),
        perception: round2(perception),
        total: round2(ad_valorem + igv + ipm + perception),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cif() {
        assert_eq!(calculate_cif(1000.0, 150.25, 12.5), 1162.75);
        assert_eq!(calculate_cif(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_import_taxes_default_rates() {
        let taxes = calculate_import_taxes(1000.0, &TaxRates::default(), &TaxExemptions::default());
        assert_eq!(taxes.cif, 1000.0);
        assert_eq!(taxes.ad_valorem, 40.0);
        assert_eq!(taxes.igv, 166.4);
        assert_eq!(taxes.ipm, 20.8);
        // (1040 + 166.4 + 20.8) * 0.035
        assert_eq!(taxes.perception, 42.95);
        assert_eq!(taxes.total, 270.15);
    }

    #[test]
    fn test_import_taxes_with_exemptions() {
        let exemptions = TaxExemptions {
            ad_valorem: true,
            perception: true,
            ..Default::default()
        };
        let taxes = calculate_import_taxes(500.0, &TaxRates::default(), &exemptions);
        assert_eq!(taxes.ad_valorem, 0.0);
        assert_eq!(taxes.igv, 80.0);
        assert_eq!(taxes.ipm, 10.0);
        assert_eq!(taxes.perception, 0.0);
        assert_eq!(taxes.total, 90.0);
    }
}
