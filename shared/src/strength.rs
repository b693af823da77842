use crate::prediction::{StrengthInput, StrengthPredictions};
use derive_more::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    Grinding,
    Chemical,
}

impl FieldGroup {
    pub fn title(&self) -> &'static str {
        match self {
            FieldGroup::Grinding => "Grinding parameters",
            FieldGroup::Chemical => "Chemical composition (%)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub group: FieldGroup,
}

const fn field(
    key: &'static str,
    label: &'static str,
    placeholder: &'static str,
    group: FieldGroup,
) -> FieldSpec {
    FieldSpec {
        key,
        label,
        placeholder,
        group,
    }
}

pub const STRENGTH_FIELDS: [FieldSpec; 14] = [
    field("initial_min", "Initial setting time (min)", "e.g. 160", FieldGroup::Grinding),
    field("final_min", "Final setting time (min)", "e.g. 200", FieldGroup::Grinding),
    field("residue_45um", "Residue 45µm (%)", "e.g. 3.2", FieldGroup::Grinding),
    field("fineness", "Fineness (cm²/g)", "e.g. 3790", FieldGroup::Grinding),
    field("loi", "Loss on ignition", "e.g. 4.37", FieldGroup::Chemical),
    field("sio2", "SiO₂", "e.g. 30.05", FieldGroup::Chemical),
    field("al2o3", "Al₂O₃", "e.g. 10.45", FieldGroup::Chemical),
    field("fe2o3", "Fe₂O₃", "e.g. 4.84", FieldGroup::Chemical),
    field("cao", "CaO", "e.g. 45.88", FieldGroup::Chemical),
    field("mgo", "MgO", "e.g. 1.5", FieldGroup::Chemical),
    field("so3", "SO₃", "e.g. 2.02", FieldGroup::Chemical),
    field("k2o", "K₂O", "e.g. 0.53", FieldGroup::Chemical),
    field("na2o", "Na₂O", "e.g. 0.31", FieldGroup::Chemical),
    field("cl", "Cl⁻", "e.g. 0.025", FieldGroup::Chemical),
];

/// Known-good lab sample used by "Load sample values".
pub const SAMPLE_VALUES: [&str; 14] = [
    "160", "200", "3.2", "3790", "4.37", "30.05", "10.45", "4.84", "45.88", "1.5", "2.02", "0.53",
    "0.31", "0.025",
];

/// Free-text strength form. Values are kept exactly as typed and only
/// coerced to numbers on submit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StrengthForm {
    values: [String; 14],
}

impl StrengthForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample() -> Self {
        let mut form = Self::new();
        form.load_sample();
        form
    }

    fn index_of(key: &str) -> Option<usize> {
        STRENGTH_FIELDS.iter().position(|spec| spec.key == key)
    }

    pub fn get(&self, key: &str) -> &str {
        Self::index_of(key)
            .map(|index| self.values[index].as_str())
            .unwrap_or("")
    }

    /// Returns false for an unknown key.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        match Self::index_of(key) {
            Some(index) => {
                self.values[index] = value.into();
                true
            }
            None => false,
        }
    }

    pub fn load_sample(&mut self) {
        for (slot, sample) in self.values.iter_mut().zip(SAMPLE_VALUES) {
            *slot = sample.to_string();
        }
    }

    pub fn reset(&mut self) {
        self.values = Default::default();
    }

    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|value| value.trim().is_empty())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&FieldSpec, &str)> {
        STRENGTH_FIELDS
            .iter()
            .zip(self.values.iter().map(String::as_str))
    }

    /// Coerces every field; anything unparseable becomes 0.
    pub fn to_input(&self) -> StrengthInput {
        let n = |key: &str| parse_number_lenient(self.get(key));
        StrengthInput {
            initial_min: n("initial_min"),
            final_min: n("final_min"),
            residue_45um: n("residue_45um"),
            fineness: n("fineness"),
            loi: n("loi"),
            sio2: n("sio2"),
            al2o3: n("al2o3"),
            fe2o3: n("fe2o3"),
            cao: n("cao"),
            mgo: n("mgo"),
            so3: n("so3"),
            k2o: n("k2o"),
            na2o: n("na2o"),
            cl: n("cl"),
        }
    }
}

/// Parses the longest numeric prefix of `text` ("12.5 %" → 12.5), the
/// way browser float parsing treats form input. No prefix means 0.
pub fn parse_number_lenient(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return 0.0;
    }
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display)]
#[display(fmt = "{:.2} MPa", _0)]
pub struct Megapascals(pub f64);

impl Megapascals {
    pub fn short(&self) -> String {
        format!("{:.1} MPa", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizon {
    OneDay,
    TwoDay,
    SevenDay,
    TwentyEightDay,
    FiftySixDay,
}

impl Horizon {
    pub const ALL: [Horizon; 5] = [
        Horizon::OneDay,
        Horizon::TwoDay,
        Horizon::SevenDay,
        Horizon::TwentyEightDay,
        Horizon::FiftySixDay,
    ];

    pub fn days(&self) -> u32 {
        match self {
            Horizon::OneDay => 1,
            Horizon::TwoDay => 2,
            Horizon::SevenDay => 7,
            Horizon::TwentyEightDay => 28,
            Horizon::FiftySixDay => 56,
        }
    }

    pub fn label(&self) -> String {
        format!("{}-Day Strength", self.days())
    }

    pub fn short_label(&self) -> String {
        format!("{}D", self.days())
    }

    pub fn value(&self, predictions: &StrengthPredictions) -> f64 {
        match self {
            Horizon::OneDay => predictions.strength_1d,
            Horizon::TwoDay => predictions.strength_2d,
            Horizon::SevenDay => predictions.strength_7d,
            Horizon::TwentyEightDay => predictions.strength_28d,
            Horizon::FiftySixDay => predictions.strength_56d,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrengthCard {
    pub horizon: Horizon,
    pub label: String,
    pub strength: Megapascals,
    /// Width of the progression bar, relative to the 56-day value.
    pub share_of_final: f64,
    pub highlighted: bool,
}

pub fn strength_cards(predictions: &StrengthPredictions) -> Vec<StrengthCard> {
    let final_strength = predictions.strength_56d;
    Horizon::ALL
        .iter()
        .map(|&horizon| {
            let value = horizon.value(predictions);
            let share = if final_strength > 0.0 {
                (value / final_strength * 100.0).clamp(0.0, 100.0)
            } else {
                0.0
            };
            StrengthCard {
                horizon,
                label: horizon.label(),
                strength: Megapascals(value),
                share_of_final: share,
                highlighted: matches!(horizon, Horizon::TwentyEightDay | Horizon::FiftySixDay),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_form_coerces_everything_to_zero() {
        let form = StrengthForm::new();
        assert!(form.is_blank());
        assert_eq!(form.to_input(), StrengthInput::default());
    }

    #[test]
    fn sample_values_fill_every_field() {
        let form = StrengthForm::sample();
        assert!(form.fields().all(|(_, value)| !value.is_empty()));
        let input = form.to_input();
        assert_eq!(input.initial_min, 160.0);
        assert_eq!(input.fineness, 3790.0);
        assert_eq!(input.cl, 0.025);
    }

    #[test]
    fn set_and_reset() {
        let mut form = StrengthForm::new();
        assert!(form.set("cao", "63.5"));
        assert!(!form.set("not_a_field", "1"));
        assert_eq!(form.get("cao"), "63.5");
        assert_eq!(form.to_input().cao, 63.5);
        form.reset();
        assert!(form.is_blank());
    }

    #[test]
    fn lenient_parsing_takes_numeric_prefix() {
        assert_eq!(parse_number_lenient("12.5"), 12.5);
        assert_eq!(parse_number_lenient("  3.2%"), 3.2);
        assert_eq!(parse_number_lenient("-0.5abc"), -0.5);
        assert_eq!(parse_number_lenient(".25"), 0.25);
        assert_eq!(parse_number_lenient("7."), 7.0);
        assert_eq!(parse_number_lenient("1e3"), 1000.0);
        assert_eq!(parse_number_lenient("2e"), 2.0);
        assert_eq!(parse_number_lenient("abc"), 0.0);
        assert_eq!(parse_number_lenient(""), 0.0);
        assert_eq!(parse_number_lenient("-"), 0.0);
        assert_eq!(parse_number_lenient("."), 0.0);
        assert_eq!(parse_number_lenient("1e999"), 0.0);
    }

    #[test]
    fn fields_are_grouped() {
        let grinding = STRENGTH_FIELDS
            .iter()
            .filter(|spec| spec.group == FieldGroup::Grinding)
            .count();
        assert_eq!(grinding, 4);
        assert_eq!(STRENGTH_FIELDS.len() - grinding, 10);
    }

    #[test]
    fn cards_cover_five_horizons() {
        let predictions = StrengthPredictions {
            strength_1d: 5.0,
            strength_2d: 8.0,
            strength_7d: 18.0,
            strength_28d: 32.0,
            strength_56d: 40.0,
            model_used: "ensemble".into(),
            confidence: Some("high".into()),
        };
        let cards = strength_cards(&predictions);
        assert_eq!(cards.len(), 5);
        assert_eq!(cards[0].label, "1-Day Strength");
        assert_eq!(cards[0].strength.to_string(), "5.00 MPa");
        assert_eq!(cards[0].strength.short(), "5.0 MPa");
        assert_eq!(cards[3].share_of_final, 80.0);
        assert_eq!(cards[4].share_of_final, 100.0);
        assert!(cards[3].highlighted && !cards[2].highlighted);
    }

    #[test]
    fn zero_final_strength_does_not_divide_by_zero() {
        let predictions = StrengthPredictions {
            strength_1d: 1.0,
            strength_2d: 0.0,
            strength_7d: 0.0,
            strength_28d: 0.0,
            strength_56d: 0.0,
            model_used: "ensemble".into(),
            confidence: None,
        };
        assert!(strength_cards(&predictions)
            .iter()
            .all(|card| card.share_of_final == 0.0));
    }
}
