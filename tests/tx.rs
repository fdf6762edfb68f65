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

    fn recreate(ses: &Ses, name: &str) -> Result<()> {
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
        ses.prep_and_exe(&format!("CREATE TABLE {} (c1 NUMBER(9))", name), &mut [])?;
        Ok(())
    }

    fn contents(ses: &Ses, name: &str) -> Result<Vec<i64>> {
        let rset = ses.prep_and_qry(&format!("SELECT c1 FROM {} ORDER BY c1", name), &mut [])?;
        let mut vals = Vec::new();
        while let Some(row) = rset.next()? {
            vals.push(row.get(0)?);
        }
        Ok(vals)
    }

    #[test]
    fn rollback_and_commit() -> Result<()> {
        let ses = open_ses()?;
        recreate(&ses, "test_tx_vals")?;

        let tx = ses.start_tx()?;
        assert!(tx.is_active());
        assert_eq!(ses.num_tx(), 1);
        ses.prep_and_exe("INSERT INTO test_tx_vals (c1) VALUES (:1)", &mut [Arg::arr(vec![3, 5])])?;
        tx.rollback()?;
        assert_eq!(ses.num_tx(), 0);

        let tx = ses.start_tx_with(TxOpts { timeout: std::time::Duration::from_secs(30), ..TxOpts::default() })?;
        ses.prep_and_exe("INSERT INTO test_tx_vals (c1) VALUES (:1)", &mut [Arg::arr(vec![7, 9])])?;
        tx.commit()?;

        ses.prep_and_exe("INSERT INTO test_tx_vals (c1) VALUES (:1)", &mut [11.into()])?;

        let other = open_ses()?;
        assert_eq!(contents(&other, "test_tx_vals")?, vec![7, 9, 11]);
        Ok(())
    }

    #[test]
    fn dropped_tx_rolls_back() -> Result<()> {
        let ses = open_ses()?;
        recreate(&ses, "test_tx_drop")?;
        {
            let _tx = ses.start_tx()?;
            ses.prep_and_exe("INSERT INTO test_tx_drop (c1) VALUES (:1)", &mut [1.into()])?;
        }
        assert_eq!(ses.num_tx(), 0);
        assert!(contents(&ses, "test_tx_drop")?.is_empty());
        Ok(())
    }

    #[test]
    fn one_tx_per_session() -> Result<()> {
        let ses = open_ses()?;
        let tx = ses.start_tx()?;
        let res = ses.start_tx();
        assert!(matches!(res, Err(ref err) if err.kind() == ErrorKind::Protocol));
        tx.commit()?;
        Ok(())
    }

    #[test]
    fn close_cascade() -> Result<()> {
        let dbname = std::env::var("DBNAME").expect("database name");
        let dbuser = std::env::var("DBUSER").expect("user name");
        let dbpass = std::env::var("DBPASS").expect("password");

        let env = drv().open_env()?;
        let srv = env.open_srv(&SrvCfg::new(&dbname))?;
        let ses = srv.open_ses(&SesCfg::new(&dbuser, &dbpass))?;
        let stmt = ses.prep("SELECT 1 FROM dual")?;
        let rset = stmt.qry(&mut [])?;
        assert_eq!(srv.num_ses(), 1);
        assert_eq!(ses.num_stmt(), 1);

        env.close()?;
        assert!(!rset.is_open());
        assert!(!stmt.is_open());
        assert!(!ses.is_open());
        assert!(!srv.is_open());
        assert_eq!(env.num_srv(), 0);
        env.close()?;

        let res = ses.prep("SELECT 1 FROM dual");
        assert!(matches!(res, Err(ref err) if err.kind() == ErrorKind::Protocol));
        Ok(())
    }
}
