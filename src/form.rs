//! Login form introspection.
//!
//! Identity providers are inconsistent about how they name credential fields, and guessing wrong
//! is a top cause of downstream login rejection, so [`FormIntrospector`] never assumes fixed
//! names: it enumerates every input of a form (hidden fields included, since they frequently
//! carry anti-forgery or session-continuity tokens) and resolves the identifier and secret
//! fields through an explicit priority algorithm.

// self
use crate::{_prelude::*, session::Credentials};

/// Field names tried, in order, when resolving the identifier input.
pub const IDENTIFIER_CANDIDATES: [&str; 5] = ["email", "username", "login", "identifiant", "user"];

static FORM_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?is)<form\b([^>]*)>(.*?)</form>").expect("Form pattern should compile.")
});
static INPUT_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?is)<input\b[^>]*>").expect("Input pattern should compile."));
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"(?i)([a-z][a-z0-9-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
		.expect("Attribute pattern should compile.")
});

/// HTTP method declared by a login form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormMethod {
	/// Submit via GET.
	Get,
	/// Submit via POST.
	Post,
}
impl FormMethod {
	/// Parses a `method` attribute; providers that omit it expect a POST in practice.
	fn from_attr(value: Option<&str>) -> Self {
		match value {
			Some(value) if value.eq_ignore_ascii_case("get") => Self::Get,
			_ => Self::Post,
		}
	}
}

/// One enumerated form input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormField {
	/// The input's `name` attribute.
	pub name: String,
	/// The input's current `value`, resubmitted verbatim for hidden fields.
	pub value: String,
	/// The input's `type` attribute, lowercased; empty when absent.
	pub kind: String,
}

/// A located, submittable login form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginForm {
	/// Absolute submit target; relative actions are resolved against the document's final URL.
	pub action: Url,
	/// Declared HTTP method.
	pub method: FormMethod,
	/// Every named input of the form, in document order.
	pub fields: Vec<FormField>,
}
impl LoginForm {
	/// Resolves the identifier field name: profile-supplied candidates first, then the built-in
	/// priority list, then the first field of type `email` or `text`.
	pub fn identifier_field(&self, extra_candidates: &[String]) -> Option<&str> {
		let candidates = extra_candidates
			.iter()
			.map(String::as_str)
			.chain(IDENTIFIER_CANDIDATES);

		for candidate in candidates {
			if let Some(field) =
				self.fields.iter().find(|field| field.name.eq_ignore_ascii_case(candidate))
			{
				return Some(&field.name);
			}
		}

		self.fields
			.iter()
			.find(|field| matches!(field.kind.as_str(), "email" | "text"))
			.map(|field| field.name.as_str())
	}

	/// Resolves the secret field: the first input of type `password`, also trying
	/// profile-supplied names when no password-typed input exists.
	pub fn password_field(&self, extra_candidates: &[String]) -> Option<&str> {
		if let Some(field) = self.fields.iter().find(|field| field.kind == "password") {
			return Some(&field.name);
		}

		extra_candidates.iter().map(String::as_str).find_map(|candidate| {
			self.fields
				.iter()
				.find(|field| field.name.eq_ignore_ascii_case(candidate))
				.map(|field| field.name.as_str())
		})
	}

	/// Builds the full resubmission map: every enumerated field keeps its current value, then
	/// the resolved identifier and secret fields are overwritten with the credentials.
	pub fn submit_fields(
		&self,
		identifier_name: &str,
		password_name: &str,
		credentials: &Credentials,
	) -> BTreeMap<String, String> {
		let mut map: BTreeMap<String, String> =
			self.fields.iter().map(|field| (field.name.clone(), field.value.clone())).collect();

		map.insert(identifier_name.to_owned(), credentials.identifier().to_owned());
		map.insert(password_name.to_owned(), credentials.secret().to_owned());

		map
	}
}

/// Locates a login form within an HTML document without assuming fixed markup.
#[derive(Debug, Default)]
pub struct FormIntrospector;
impl FormIntrospector {
	/// Finds the most plausible login form in `body`.
	///
	/// Forms containing a password-typed input win over the first form on the page; `None` means
	/// no `<form>`-like submittable structure exists, which signals the resolver to try the next
	/// strategy rather than abort.
	pub fn locate(body: &str, document_url: &Url) -> Option<LoginForm> {
		let mut first = None;

		for captures in FORM_RE.captures_iter(body) {
			let attrs = attributes(captures.get(1).map(|m| m.as_str()).unwrap_or_default());
			let inner = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
			let fields = enumerate_fields(inner);
			let action = match attrs.get("action").filter(|value| !value.is_empty()) {
				Some(action) => match document_url.join(action) {
					Ok(action) => action,
					Err(_) => continue,
				},
				None => document_url.clone(),
			};
			let form = LoginForm {
				action,
				method: FormMethod::from_attr(attrs.get("method").map(String::as_str)),
				fields,
			};

			if form.fields.iter().any(|field| field.kind == "password") {
				return Some(form);
			}
			if first.is_none() {
				first = Some(form);
			}
		}

		first
	}
}

fn enumerate_fields(inner: &str) -> Vec<FormField> {
	INPUT_RE
		.find_iter(inner)
		.filter_map(|m| {
			let attrs = attributes(m.as_str());
			let name = attrs.get("name")?.clone();

			if name.is_empty() {
				return None;
			}

			Some(FormField {
				name,
				value: attrs.get("value").cloned().unwrap_or_default(),
				kind: attrs.get("type").map(|kind| kind.to_ascii_lowercase()).unwrap_or_default(),
			})
		})
		.collect()
}

fn attributes(fragment: &str) -> BTreeMap<String, String> {
	ATTR_RE
		.captures_iter(fragment)
		.map(|captures| {
			let key = captures[1].to_ascii_lowercase();
			let value = captures
				.get(2)
				.or_else(|| captures.get(3))
				.or_else(|| captures.get(4))
				.map(|m| m.as_str().to_owned())
				.unwrap_or_default();

			(key, value)
		})
		.collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn base() -> Url {
		Url::parse("https://idp.example/cas/login?service=x").expect("Base URL should parse.")
	}

	const CAS_PAGE: &str = r#"
		<html><body>
		<form id="fm1" action="/cas/login;jsessionid=ABC?service=x" method="post">
			<input type="text" name="user" value="" />
			<input type="password" name="pass" value="">
			<input type="hidden" name="execution" value="e1s1">
			<INPUT TYPE="HIDDEN" NAME="lt" VALUE="LT-42">
			<input type="submit" value="SE CONNECTER">
		</form>
		</body></html>
	"#;

	#[test]
	fn locates_the_password_bearing_form_and_hidden_fields() {
		let form = FormIntrospector::locate(CAS_PAGE, &base())
			.expect("Introspector should locate the CAS form.");

		assert_eq!(form.method, FormMethod::Post);
		assert_eq!(form.action.path(), "/cas/login;jsessionid=ABC");
		assert_eq!(form.identifier_field(&[]), Some("user"));
		assert_eq!(form.password_field(&[]), Some("pass"));

		let fields: Vec<_> = form.fields.iter().map(|field| field.name.as_str()).collect();

		assert_eq!(fields, ["user", "pass", "execution", "lt"]);
	}

	#[test]
	fn hidden_fields_are_resubmitted_verbatim() {
		let form = FormIntrospector::locate(CAS_PAGE, &base())
			.expect("Introspector should locate the CAS form.");
		let credentials = Credentials::new("jane.doe", "hunter2");
		let submit = form.submit_fields("user", "pass", &credentials);

		assert_eq!(submit.get("execution").map(String::as_str), Some("e1s1"));
		assert_eq!(submit.get("lt").map(String::as_str), Some("LT-42"));
		assert_eq!(submit.get("user").map(String::as_str), Some("jane.doe"));
		assert_eq!(submit.get("pass").map(String::as_str), Some("hunter2"));
	}

	#[test]
	fn profile_candidates_take_priority_over_builtins() {
		let body = r#"<form action="" method="post">
			<input type="text" name="email">
			<input type="text" name="j_username">
			<input type="password" name="j_password">
		</form>"#;
		let form =
			FormIntrospector::locate(body, &base()).expect("Introspector should locate the form.");

		assert_eq!(form.identifier_field(&["j_username".into()]), Some("j_username"));
		assert_eq!(form.identifier_field(&[]), Some("email"));
	}

	#[test]
	fn falls_back_to_the_first_text_field() {
		let body = r#"<form action="/login" method="POST">
			<input type="hidden" name="csrf" value="t">
			<input type="text" name="numero_dossier">
			<input type="password" name="code_secret">
		</form>"#;
		let form =
			FormIntrospector::locate(body, &base()).expect("Introspector should locate the form.");

		assert_eq!(form.identifier_field(&[]), Some("numero_dossier"));
		assert_eq!(form.password_field(&[]), Some("code_secret"));
	}

	#[test]
	fn missing_form_yields_none_not_an_error() {
		assert!(FormIntrospector::locate("<html><body>Bienvenue</body></html>", &base()).is_none());
	}

	#[test]
	fn formless_page_with_only_links_prefers_first_form_when_no_password_exists() {
		let body = r#"<form action="/search" method="get">
			<input type="text" name="q">
		</form>"#;
		let form =
			FormIntrospector::locate(body, &base()).expect("Introspector should pick the only form.");

		assert_eq!(form.method, FormMethod::Get);
		assert!(form.password_field(&[]).is_none());
	}
}
