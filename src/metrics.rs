//! Projection of parsed SMART data into line-protocol fields.

use crate::models::device::DeviceDescriptor;
use crate::models::smart::{DeviceInfo, SmartAttribute};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};

static FIELD_NAME_FILTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("valid regex"));

/// Sanitized field key → quoted value, iterated in key order.
pub type MetricFieldSet = BTreeMap<String, String>;

/// When an attribute field is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Always emitted.
    Value,
    /// Emitted only in detailed mode.
    Detail,
}

/// One projected attribute field: role, key suffix, and how to render it.
pub struct AttributeField {
    pub role:   FieldRole,
    pub suffix: &'static str,
    pub render: fn(&SmartAttribute) -> String,
}

/// Declared projection of a SMART attribute. Suffixes keep the historical key names.
pub const ATTRIBUTE_FIELDS: &[AttributeField] = &[
    AttributeField { role: FieldRole::Detail, suffix: "Flag",            render: |a| a.flag.to_string() },
    AttributeField { role: FieldRole::Value,  suffix: "Value",           render: |a| a.value.to_string() },
    AttributeField { role: FieldRole::Value,  suffix: "Worst",           render: |a| a.worst.to_string() },
    AttributeField { role: FieldRole::Value,  suffix: "Thresh",          render: |a| a.thresh.to_string() },
    AttributeField { role: FieldRole::Detail, suffix: "Type",            render: |a| a.attr_type.clone() },
    AttributeField { role: FieldRole::Detail, suffix: "Updated",         render: |a| a.updated.clone() },
    AttributeField { role: FieldRole::Detail, suffix: "when_failed",     render: |a| a.when_failed.clone() },
    AttributeField { role: FieldRole::Value,  suffix: "raw_value",       render: |a| a.raw_value.to_string() },
    AttributeField {
        role:   FieldRole::Detail,
        suffix: "raw_value_notes",
        render: |a| a.raw_value_notes.clone().unwrap_or_default(),
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Include the attribute name in field keys (`194_Temperature_Celsius_raw_value`).
    pub use_names: bool,
    /// Also emit detail-role fields.
    pub detailed:  bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self { use_names: true, detailed: false }
    }
}

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
pub fn sanitize_key(key: &str) -> String {
    FIELD_NAME_FILTER_RE.replace_all(key, "_").into_owned()
}

/// Double-quote a field value, escaping `"` and `\`.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn attribute_key(attr: &SmartAttribute, use_names: bool, suffix: &str) -> String {
    let key = if use_names {
        format!("{}_{}_{}", attr.id, attr.name, suffix)
    } else {
        format!("{}_{}", attr.id, suffix)
    };
    sanitize_key(&key)
}

/// Insert the fields of one attribute into `fields`.
pub fn encode_attribute(fields: &mut MetricFieldSet, attr: &SmartAttribute, opts: EncodeOptions) {
    for f in ATTRIBUTE_FIELDS {
        if f.role == FieldRole::Detail && !opts.detailed {
            continue;
        }
        fields.insert(attribute_key(attr, opts.use_names, f.suffix), quote(&(f.render)(attr)));
    }
}

/// Build the field set for one device.
///
/// `disk_status` carries the raw health text and is always present.
/// Attribute fields are only emitted for SMART-capable devices and only for
/// IDs in `allowed`.
pub fn encode(
    info:       &DeviceInfo,
    attributes: &[SmartAttribute],
    allowed:    &HashSet<u32>,
    opts:       EncodeOptions,
) -> MetricFieldSet {
    let mut fields = MetricFieldSet::new();
    fields.insert("disk_status".to_string(), quote(&info.health));

    if info.smart_support {
        for attr in attributes.iter().filter(|a| allowed.contains(&a.id)) {
            encode_attribute(&mut fields, attr, opts);
        }
    }
    fields
}

/// Render `<name>,host=<host>,disk=<path>,type=<type> k1="v1",k2="v2"`.
pub fn render_line(check_name: &str, host: &str, dev: &DeviceDescriptor, fields: &MetricFieldSet) -> String {
    let joined = fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",");
    format!("{},host={},disk={},type={} {}", check_name, host, dev.path, dev.type_tag(), joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temperature() -> SmartAttribute {
        SmartAttribute {
            id:              194,
            name:            "Temperature_Celsius".into(),
            flag:            0x0002,
            value:           157,
            worst:           157,
            thresh:          0,
            attr_type:       "Old_age".into(),
            updated:         "Always".into(),
            when_failed:     "-".into(),
            raw_value:       38,
            raw_value_notes: Some("(Min/Max 24/45)".into()),
        }
    }

    fn power_off_retract() -> SmartAttribute {
        SmartAttribute {
            id:              192,
            name:            "Power-Off_Retract_Count".into(),
            flag:            0x0032,
            value:           100,
            worst:           100,
            thresh:          0,
            attr_type:       "Old_age".into(),
            updated:         "Always".into(),
            when_failed:     "-".into(),
            raw_value:       132,
            raw_value_notes: None,
        }
    }

    fn smart_info() -> DeviceInfo {
        DeviceInfo {
            smart_support: true,
            health:        "PASSED".into(),
            healthy:       true,
            ..DeviceInfo::default()
        }
    }

    #[test]
    fn sanitize_replaces_everything_but_word_chars() {
        assert_eq!(sanitize_key("192_Power-Off_Retract_Count_Value"), "192_Power_Off_Retract_Count_Value");
        assert_eq!(sanitize_key("a b/c.d"), "a_b_c_d");
        assert_eq!(sanitize_key("already_ok_123"), "already_ok_123");
    }

    #[test]
    fn quote_escapes_quotes_and_backslashes() {
        assert_eq!(quote("PASSED"), r#""PASSED""#);
        assert_eq!(quote(r#"a "b" \c"#), r#""a \"b\" \\c""#);
    }

    #[test]
    fn value_fields_only_by_default() {
        let fields = encode(&smart_info(), &[temperature()], &HashSet::from([194]), EncodeOptions::default());
        assert_eq!(fields.len(), 5);
        assert_eq!(fields["disk_status"], r#""PASSED""#);
        assert_eq!(fields["194_Temperature_Celsius_Value"], r#""157""#);
        assert_eq!(fields["194_Temperature_Celsius_Worst"], r#""157""#);
        assert_eq!(fields["194_Temperature_Celsius_Thresh"], r#""0""#);
        assert_eq!(fields["194_Temperature_Celsius_raw_value"], r#""38""#);
    }

    #[test]
    fn detailed_adds_detail_fields() {
        let opts = EncodeOptions { use_names: true, detailed: true };
        let fields = encode(&smart_info(), &[temperature()], &HashSet::from([194]), opts);
        assert_eq!(fields.len(), 10);
        assert_eq!(fields["194_Temperature_Celsius_Flag"], r#""2""#);
        assert_eq!(fields["194_Temperature_Celsius_Type"], r#""Old_age""#);
        assert_eq!(fields["194_Temperature_Celsius_Updated"], r#""Always""#);
        assert_eq!(fields["194_Temperature_Celsius_when_failed"], r#""-""#);
        assert_eq!(fields["194_Temperature_Celsius_raw_value_notes"], r#""(Min/Max 24/45)""#);
    }

    #[test]
    fn keys_without_names() {
        let opts = EncodeOptions { use_names: false, detailed: false };
        let fields = encode(&smart_info(), &[power_off_retract()], &HashSet::from([192]), opts);
        assert_eq!(fields["192_raw_value"], r#""132""#);
        assert!(fields.keys().all(|k| !k.contains("Retract")));
    }

    #[test]
    fn attributes_outside_allow_list_are_dropped() {
        let attrs = [temperature(), power_off_retract()];
        let fields = encode(&smart_info(), &attrs, &HashSet::from([192, 5]), EncodeOptions::default());
        assert!(fields.keys().all(|k| !k.starts_with("194_")));
        assert_eq!(fields["192_Power_Off_Retract_Count_raw_value"], r#""132""#);
    }

    #[test]
    fn no_smart_support_only_reports_status() {
        let info = DeviceInfo::default();
        let fields = encode(&info, &[temperature()], &HashSet::from([194]), EncodeOptions::default());
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["disk_status"], r#""UNSUPPORTED""#);
    }

    #[test]
    fn duplicate_ids_overwrite() {
        let mut second = temperature();
        second.raw_value = 40;
        let fields = encode(&smart_info(), &[temperature(), second], &HashSet::from([194]), EncodeOptions::default());
        assert_eq!(fields["194_Temperature_Celsius_raw_value"], r#""40""#);
    }

    #[test]
    fn line_is_rendered_in_key_order() {
        let dev = DeviceDescriptor::new("/dev/bus/4 -d megaraid,14 ", "/dev/bus/4", "megaraid,14");
        let fields = encode(&smart_info(), &[temperature()], &HashSet::from([194]), EncodeOptions::default());
        assert_eq!(
            render_line("smartcheck", "db1", &dev, &fields),
            "smartcheck,host=db1,disk=/dev/bus/4,type=megaraid_14 \
             194_Temperature_Celsius_Thresh=\"0\",194_Temperature_Celsius_Value=\"157\",\
             194_Temperature_Celsius_Worst=\"157\",194_Temperature_Celsius_raw_value=\"38\",\
             disk_status=\"PASSED\""
        );
    }
}
