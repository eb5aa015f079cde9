//! Support for the tracking pages built with ASP.NET WebForms. Such pages
//! reject the form submission unless the hidden state inputs that were
//! rendered with the form are sent back unchanged.

use scraper::{Html, Selector};

/// Collects the `name`/`value` pairs of all the hidden inputs in the document
/// order. Inputs without a name are not submitted by browsers, so they are
/// skipped as well.
pub(crate) fn hidden_fields(html: &str) -> Vec<(String, String)> {
    let document = Html::parse_document(html);

    document
        .select(&selector())
        .filter_map(|input| {
            let input = input.value();
            let is_hidden = input
                .attr("type")
                .is_some_and(|kind| kind.eq_ignore_ascii_case("hidden"));

            if !is_hidden {
                return None;
            }

            let name = input.attr("name")?;
            let value = input.attr("value").unwrap_or_default();
            Some((name.to_owned(), value.to_owned()))
        })
        .collect()
}

fn selector() -> Selector {
    Selector::parse("input[type]")
        .unwrap_or_else(|err| panic!("BUG: invalid hidden input selector: {err:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    #[test]
    fn collects_aspnet_state() {
        let html = r#"
            <form method="post" action="./track">
                <input type="hidden" name="__VIEWSTATE" id="__VIEWSTATE" value="dDwtMTA4==" />
                <input type="hidden" name="__VIEWSTATEGENERATOR" value="CA0B0334" />
                <input type="HIDDEN" name="__EVENTVALIDATION" value="/wEdAAK" />
                <input type="hidden" name="__EVENTTARGET" />
                <input type="hidden" value="no-name" />
                <input type="text" name="txtConsignment" value="" />
                <input type="submit" name="btnSearch" value="Search" />
            </form>
        "#;

        expect![[r#"
            [
                (
                    "__VIEWSTATE",
                    "dDwtMTA4==",
                ),
                (
                    "__VIEWSTATEGENERATOR",
                    "CA0B0334",
                ),
                (
                    "__EVENTVALIDATION",
                    "/wEdAAK",
                ),
                (
                    "__EVENTTARGET",
                    "",
                ),
            ]
        "#]]
        .assert_debug_eq(&hidden_fields(html));
    }

    #[test]
    fn no_form() {
        assert_eq!(hidden_fields("<p>Service unavailable</p>"), vec![]);
    }
}
