/*
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! bit-exact reproduction of the upstream URL template engine: `%s` substitutes the positional
//! argument verbatim, `%sU`/`%sL` substitute its upper/lowercase form. Arguments are consumed in
//! template order, one per `%`-delimited segment, mirroring the original `formatString` helper.

pub fn format_template (template: &str, args: &[&str]) -> String {
    let parts: Vec<&str> = template.split('%').collect();
    let mut result = String::with_capacity(template.len() + 16);

    for (i, part) in parts.iter().enumerate() {
        if i == 0 {
            result.push_str(part);
            continue;
        }
        if part.is_empty() {
            continue;
        }

        let arg = args.get(i - 1).copied().unwrap_or("");
        if let Some(rest) = part.strip_prefix("sU") {
            result.push_str(&arg.to_uppercase());
            result.push_str(rest);
        } else if let Some(rest) = part.strip_prefix("sL") {
            result.push_str(&arg.to_lowercase());
            result.push_str(rest);
        } else if let Some(rest) = part.strip_prefix('s') {
            result.push_str(arg);
            result.push_str(rest);
        } else {
            result.push('%');
            result.push_str(part);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_template_substitutes_in_order() {
        let template = "https://opendata.dwd.de/weather/nwp/%sL/grib/%s/%sL/%sL_%s_%s_single-level_%s%s_%s_%sU.grib2.bz2";
        let url = format_template(template, &["icon", "00", "t_2m", "icon", "global", "icosahedral", "20260305", "00", "078", "t_2m"]);
        assert_eq!(url, "https://opendata.dwd.de/weather/nwp/icon/grib/00/icon/icon_t_2m_icosahedral_single-level_2026030500_078_T_2M.grib2.bz2");
    }

    #[test]
    fn plain_percent_without_specifier_is_passed_through() {
        assert_eq!(format_template("100%done", &[]), "100%done");
    }
}
