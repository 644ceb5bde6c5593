//! Preset list of identifiers that `windows.h` redefines as `...A`/`...W`
//! macros. A method with one of these names silently changes its name in
//! translation units that include `windows.h`.
//!
//! The list can be extended with `[audit].windows_mangle_names` or replaced
//! wholesale with `[audit].windows_mangle` in `vtkstyle.toml`.

pub const DEFAULT_NAMES: &[&str] = &[
    "AddAtom",
    "AddFontResource",
    "AppendMenu",
    "BuildCommDCB",
    "CallWindowProc",
    "ChangeDisplaySettings",
    "CharLower",
    "CharNext",
    "CharPrev",
    "CharToOem",
    "CharUpper",
    "CopyFile",
    "CopyMetaFile",
    "CreateDC",
    "CreateDialog",
    "CreateDirectory",
    "CreateEvent",
    "CreateFile",
    "CreateFileMapping",
    "CreateFont",
    "CreateMDIWindow",
    "CreateMutex",
    "CreateProcess",
    "CreateSemaphore",
    "CreateWindow",
    "DefWindowProc",
    "DeleteFile",
    "DialogBox",
    "DispatchMessage",
    "DrawState",
    "DrawText",
    "EnumFontFamilies",
    "EnumFonts",
    "EnumProps",
    "ExpandEnvironmentStrings",
    "ExtTextOut",
    "FindAtom",
    "FindFirstFile",
    "FindNextFile",
    "FindResource",
    "FindWindow",
    "FormatMessage",
    "FreeEnvironmentStrings",
    "GetAtomName",
    "GetCharWidth",
    "GetClassInfo",
    "GetClassLong",
    "GetCommandLine",
    "GetComputerName",
    "GetCurrentDirectory",
    "GetDiskFreeSpace",
    "GetDriveType",
    "GetEnvironmentVariable",
    "GetFileAttributes",
    "GetFullPathName",
    "GetGlyphOutline",
    "GetKeyNameText",
    "GetLogicalDriveStrings",
    "GetMessage",
    "GetModuleFileName",
    "GetModuleHandle",
    "GetMonitorInfo",
    "GetOpenFileName",
    "GetPrivateProfileString",
    "GetProfileString",
    "GetProp",
    "GetSaveFileName",
    "GetShortPathName",
    "GetStartupInfo",
    "GetSystemDirectory",
    "GetTempFileName",
    "GetTempPath",
    "GetTextExtentPoint",
    "GetTextFace",
    "GetTextMetrics",
    "GetUserName",
    "GetVersionEx",
    "GetVolumeInformation",
    "GetWindowLong",
    "GetWindowText",
    "GetWindowsDirectory",
    "GlobalAddAtom",
    "InsertMenu",
    "IsDialogMessage",
    "LoadBitmap",
    "LoadCursor",
    "LoadIcon",
    "LoadImage",
    "LoadLibrary",
    "LoadMenu",
    "LoadString",
    "MessageBox",
    "ModifyMenu",
    "MoveFile",
    "OpenEvent",
    "OpenMutex",
    "OpenSemaphore",
    "OutputDebugString",
    "PeekMessage",
    "PostMessage",
    "PostThreadMessage",
    "RegCreateKey",
    "RegDeleteKey",
    "RegDeleteValue",
    "RegEnumKey",
    "RegEnumValue",
    "RegOpenKey",
    "RegQueryValue",
    "RegSetValue",
    "RegisterClass",
    "RegisterWindowMessage",
    "RemoveDirectory",
    "RemoveProp",
    "ReportEvent",
    "SearchPath",
    "SendDlgItemMessage",
    "SendMessage",
    "SetClassLong",
    "SetCurrentDirectory",
    "SetEnvironmentVariable",
    "SetFileAttributes",
    "SetProp",
    "SetWindowLong",
    "SetWindowText",
    "SetWindowsHookEx",
    "StartDoc",
    "TextOut",
    "UnregisterClass",
    "VerQueryValue",
    "WinHelp",
    "WriteConsole",
    "WritePrivateProfileString",
    "WriteProfileString",
    "wsprintf",
    "wvsprintf",
];

/// Build a word-bounded alternation with the matched name in group 1.
pub fn build_pattern<S: AsRef<str>>(names: &[S]) -> String {
    let alts: Vec<String> = names
        .iter()
        .map(|n| regex::escape(n.as_ref().trim()))
        .filter(|n| !n.is_empty())
        .collect();
    format!(r"\b({})\b", alts.join("|"))
}

/// Preset names followed by any configured extras.
pub fn default_pattern_with<S: AsRef<str>>(extra: &[S]) -> String {
    let mut names: Vec<&str> = DEFAULT_NAMES.to_vec();
    names.extend(extra.iter().map(|s| s.as_ref()));
    build_pattern(&names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_pattern_matches_whole_words_only() {
        let re = Regex::new(&default_pattern_with::<&str>(&[])).unwrap();
        assert!(re.is_match("  int SendMessage(int msg);"));
        assert!(!re.is_match("  int SendMessages(int msg);"));
        assert!(!re.is_match("  void GetClassName();"));
    }

    #[test]
    fn test_extra_names_are_escaped_and_appended() {
        let re = Regex::new(&default_pattern_with(&["My.Name"])).unwrap();
        assert_eq!(
            re.captures("call My.Name()").unwrap().get(1).unwrap().as_str(),
            "My.Name"
        );
        assert!(!re.is_match("call MyxName()"));
    }
}
