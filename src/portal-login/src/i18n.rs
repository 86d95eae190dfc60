//! User-facing strings.
//!
//! Vietnamese is the default locale; English is provided as a translation.

use std::str::FromStr;

/// Supported display languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Vietnamese,
    English,
}

impl Locale {
    /// Short language tag ("vi", "en").
    pub fn tag(&self) -> &'static str {
        match self {
            Locale::Vietnamese => "vi",
            Locale::English => "en",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vi" | "vi-vn" | "vietnamese" => Ok(Locale::Vietnamese),
            "en" | "en-us" | "en-gb" | "english" => Ok(Locale::English),
            other => Err(format!("unsupported locale '{other}' (expected 'vi' or 'en')")),
        }
    }
}

/// Keys for every translatable string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Message {
    PhoneRequired,
    PhonePattern,
    PhoneLength,
    PasswordRequired,
    PasswordTooShort,
    LoginSucceeded,
    LoginFailed,
    TryAgainLater,
    Title,
    Subtitle,
    PhoneLabel,
    PhonePlaceholder,
    PasswordLabel,
    PasswordPlaceholder,
    ForgotPassword,
    SubmitLabel,
    NoAccount,
    RegisterNow,
}

/// Look up a message in the given locale.
pub fn text(locale: Locale, message: Message) -> &'static str {
    use Message::*;
    match locale {
        Locale::Vietnamese => match message {
            PhoneRequired => "Vui lòng nhập số điện thoại",
            PhonePattern => "Số điện thoại chỉ được chứa số",
            PhoneLength => "Số điện thoại không hợp lệ",
            PasswordRequired => "Vui lòng nhập mật khẩu",
            PasswordTooShort => "Mật khẩu phải có ít nhất 6 ký tự",
            LoginSucceeded => "Đăng nhập thành công",
            LoginFailed => "Đăng nhập thất bại",
            TryAgainLater => "Vui lòng thử lại sau",
            Title => "ĐĂNG NHẬP",
            Subtitle => "Vui lòng nhập số điện thoại đã đăng ký",
            PhoneLabel => "Số điện thoại",
            PhonePlaceholder => "VD: 0938123456",
            PasswordLabel => "Mật khẩu",
            PasswordPlaceholder => "Nhập mật khẩu",
            ForgotPassword => "Quên mật khẩu?",
            SubmitLabel => "Đăng nhập",
            NoAccount => "Bạn chưa có tài khoản?",
            RegisterNow => "Đăng ký ngay",
        },
        Locale::English => match message {
            PhoneRequired => "Please enter your phone number",
            PhonePattern => "Phone number may only contain digits",
            PhoneLength => "Invalid phone number",
            PasswordRequired => "Please enter your password",
            PasswordTooShort => "Password must be at least 6 characters",
            LoginSucceeded => "Signed in successfully",
            LoginFailed => "Sign-in failed",
            TryAgainLater => "Please try again later",
            Title => "SIGN IN",
            Subtitle => "Enter the phone number you registered with",
            PhoneLabel => "Phone number",
            PhonePlaceholder => "e.g. 0938123456",
            PasswordLabel => "Password",
            PasswordPlaceholder => "Enter your password",
            ForgotPassword => "Forgot password?",
            SubmitLabel => "Sign in",
            NoAccount => "Don't have an account?",
            RegisterNow => "Register now",
        },
    }
}

/// Footer line pointing users at the support hotline.
pub fn support_line(locale: Locale, hotline: &str) -> String {
    match locale {
        Locale::Vietnamese => {
            format!("Vui lòng liên hệ hotline {hotline} nếu bạn cần hỗ trợ.")
        }
        Locale::English => format!("Call our hotline {hotline} if you need help."),
    }
}
