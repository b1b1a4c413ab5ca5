use super::*;

#[test]
fn permission_denied_is_retriable() {
    let err = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
    assert_eq!(classify_io(&err), ErrorClass::Retriable);
}

#[test]
fn not_found_is_terminal() {
    let err = std::io::Error::from(std::io::ErrorKind::NotFound);
    assert_eq!(classify_io(&err), ErrorClass::Terminal);
}

#[test]
fn non_success_status_is_retriable() {
    let status = NonSuccessStatus { status: 503 };
    assert_eq!(classify_status(&status), ErrorClass::Retriable);
}
