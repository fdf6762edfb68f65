#![cfg(feature="db-tests")]

mod tests {
    use ora::*;

    fn open_ses() -> Result<Ses> {
        let dbname = std::env::var("DBNAME").expect("database name");
        let dbuser = std::env::var("DBUSER").expect("user name");
        let dbpass = std::env::var("DBPASS").expect("password");

        let env = drv().open_env()?;
        let srv = env.open_srv(&SrvCfg::new(&dbname))?;
        srv.open_ses(&SesCfg::new(&dbuser, &dbpass))
    }

    fn recreate(ses: &Ses, name: &str, columns: &str) -> Result<()> {
        ses.prep_and_exe(&format!("
            BEGIN
                EXECUTE IMMEDIATE 'DROP TABLE {}';
            EXCEPTION
                WHEN OTHERS THEN
                    IF sqlcode != -942 THEN
                        RAISE;
                    END IF;
            END;
        ", name), &mut [])?;
        ses.prep_and_exe(&format!("CREATE TABLE {} ({})", name, columns), &mut [])?;
        Ok(())
    }

    #[test]
    fn integer_slice() -> Result<()> {
        let ses = open_ses()?;
        recreate(&ses, "test_int_slice", "c1 NUMBER(19,0)")?;

        let stmt = ses.prep("INSERT INTO test_int_slice (c1) VALUES (:1)")?;
        let rows = stmt.exe(&mut [Arg::arr(vec![-9i64, -1, 0, 1, 9])])?;
        assert_eq!(rows, 5);

        let rset = ses.prep_and_qry("SELECT c1 FROM test_int_slice ORDER BY c1", &mut [])?;
        assert_eq!(rset.columns()[0].gct, ColumnType::I64);
        let mut vals = Vec::new();
        while let Some(row) = rset.next()? {
            assert!(matches!(row.value(0)?, Value::I64(_)));
            vals.push(row.get::<i64, _>(0)?);
        }
        assert_eq!(vals, vec![-9, -1, 0, 1, 9]);
        assert_eq!(rset.len(), 5);
        Ok(())
    }

    #[test]
    fn nullable_strings() -> Result<()> {
        let ses = open_ses()?;
        recreate(&ses, "test_null_str", "c0 NUMBER(3), c1 VARCHAR2(48 CHAR)")?;

        let stmt = ses.prep("INSERT INTO test_null_str (c0, c1) VALUES (:1, :2)")?;
        let rows = stmt.exe(&mut [
            Arg::arr(vec![1, 2, 3]),
            Arg::arr_as(vec![Ora::new("a".to_string()), Ora::null(), Ora::new("b".to_string())], ColumnType::OraStr),
        ])?;
        assert_eq!(rows, 3);

        let stmt = ses.prep("SELECT c1 FROM test_null_str ORDER BY c0")?;
        stmt.set_gcts(vec![ColumnType::OraStr]);
        let rset = stmt.qry(&mut [])?;
        let mut vals = Vec::new();
        while let Some(row) = rset.next()? {
            vals.push(row.get::<Ora<String>, _>(0)?);
        }
        assert_eq!(vals, vec![Ora::new("a".to_string()), Ora::null(), Ora::new("b".to_string())]);
        Ok(())
    }

    #[test]
    fn bad_override() -> Result<()> {
        let ses = open_ses()?;
        let stmt = ses.prep("SELECT sysdate FROM dual")?;
        stmt.set_gcts(vec![ColumnType::I64]);
        let res = stmt.qry(&mut []);
        assert!(matches!(res, Err(ref err) if err.kind() == ErrorKind::Config));
        Ok(())
    }

    #[test]
    fn plsql_out_args() -> Result<()> {
        let ses = open_ses()?;
        let stmt = ses.prep("
            BEGIN
                :2 := Upper(:1);
                :3 := Nvl(:3, 0) + 1;
            END;
        ")?;
        let mut up = Value::Null;
        let mut cnt = Value::Null;
        stmt.exe(&mut [
            "abc".into(),
            Arg::out_as(&mut up, ColumnType::Str),
            Arg::out_as(&mut cnt, ColumnType::OraI64),
        ])?;
        assert_eq!(up, Value::Str("ABC".into()));
        assert_eq!(cnt, Value::I64(1));
        Ok(())
    }

    #[test]
    fn assoc_arrays() -> Result<()> {
        let ses = open_ses()?;
        let stmt = ses.prep("
            DECLARE
                TYPE num_tab IS TABLE OF NUMBER INDEX BY PLS_INTEGER;
                nums num_tab;
            BEGIN
                nums := :1;
                FOR i IN 1 .. nums.COUNT LOOP
                    nums(i) := nums(i) * 2;
                END LOOP;
                :1 := nums;
            END;
        ")?;
        let mut nums = vec![Value::I64(1), Value::I64(2), Value::I64(3)];
        stmt.exe(&mut [Arg::out_arr(&mut nums, ColumnType::I64)])?;
        assert_eq!(nums, vec![Value::I64(2), Value::I64(4), Value::I64(6)]);
        Ok(())
    }

    #[test]
    fn arrays_in_queries() -> Result<()> {
        let ses = open_ses()?;
        let stmt = ses.prep("SELECT dummy FROM dual WHERE dummy = :1")?;
        let res = stmt.qry(&mut [Arg::arr(vec!["X", "Y"])]);
        assert!(matches!(res, Err(ref err) if err.kind() == ErrorKind::Bind));
        assert!(stmt.is_open());
        Ok(())
    }

    #[test]
    fn config_isolation() -> Result<()> {
        let ses = open_ses()?;
        let s1 = ses.prep("SELECT 1 FROM dual")?;
        let s2 = ses.prep("SELECT 2 FROM dual")?;
        s1.set_cfg(s1.cfg().with_fetch_len(1))?;
        assert_eq!(s1.cfg().fetch_len(), 1);
        assert_eq!(s2.cfg().fetch_len(), DEFAULT_FETCH_LEN);
        assert_eq!(ses.cfg().fetch_len(), DEFAULT_FETCH_LEN);
        Ok(())
    }
}
